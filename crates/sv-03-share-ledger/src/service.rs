//! # Share Ledger Service
//!
//! Source-side request origination and share accounting for one domain.
//! Deposits mint nothing until the destination confirms execution; withdraws
//! burn at request acceptance, which is the linearization point that makes a
//! second withdraw against the same shares fail while the first is in
//! flight.

use crate::domain::{LedgerError, PendingRequest, RequestBook, ShareBalanceTable};
use crate::ports::inbound::{DepositEntry, LedgerApi, WithdrawEntry};
use crate::ports::outbound::{AssetBridge, InstructionDispatcher};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    Action, Address, Amount, CapabilityGuard, DomainId, ExecutionOutcome, Instruction,
    InstructionError, InstructionId, InstructionStatus, OutcomeStatus, TxKind, VaultId,
    WirePayload,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Per-domain ledger configuration.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Domain this ledger accounts on.
    pub domain: DomainId,
    /// Identity this ledger dispatches as (the payload `origin`).
    pub identity: Address,
    /// Fee allowance stamped on every outbound instruction.
    pub default_fee_budget: Amount,
}

/// Tables owned by the ledger. Single writer: this ledger.
struct LedgerState {
    balances: ShareBalanceTable,
    book: RequestBook,
    /// Vault id -> home domain, set administratively. Withdraws derive
    /// their destination from this map; deposits are cross-checked.
    vault_domains: HashMap<VaultId, DomainId>,
}

/// Share ledger for one domain.
pub struct ShareLedger<B, D>
where
    B: AssetBridge,
    D: InstructionDispatcher,
{
    config: LedgerConfig,
    state: RwLock<LedgerState>,
    bridge: Arc<B>,
    dispatcher: Arc<D>,
    guard: Arc<dyn CapabilityGuard>,
}

impl<B, D> ShareLedger<B, D>
where
    B: AssetBridge,
    D: InstructionDispatcher,
{
    /// Create a ledger with empty tables.
    pub fn new(
        config: LedgerConfig,
        bridge: Arc<B>,
        dispatcher: Arc<D>,
        guard: Arc<dyn CapabilityGuard>,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(LedgerState {
                balances: ShareBalanceTable::new(),
                book: RequestBook::new(),
                vault_domains: HashMap::new(),
            }),
            bridge,
            dispatcher,
            guard,
        }
    }

    /// Domain this ledger serves.
    pub fn domain(&self) -> DomainId {
        self.config.domain
    }

    /// Map a vault id to its home domain.
    pub fn set_vault_domain(
        &self,
        caller: &Address,
        vault_id: VaultId,
        domain: DomainId,
    ) -> Result<(), LedgerError> {
        if !self.guard.has_capability(caller, Action::SetVaultDomain) {
            return Err(LedgerError::Unauthorized {
                caller: *caller,
                action: Action::SetVaultDomain,
            });
        }
        self.state.write().vault_domains.insert(vault_id, domain);
        info!("[sv-03] vault {} mapped to domain {}", vault_id, domain);
        Ok(())
    }

    /// Registered home domain for a vault.
    pub fn vault_domain(&self, vault_id: VaultId) -> Option<DomainId> {
        self.state.read().vault_domains.get(&vault_id).copied()
    }

    /// Units outstanding across all holders of a vault.
    pub fn total_issued(&self, vault_id: VaultId) -> Amount {
        self.state.read().balances.total_issued(vault_id)
    }

    /// The dispatched instruction, with its source-side status.
    pub fn instruction_of(&self, instruction_id: InstructionId) -> Option<Instruction> {
        self.state
            .read()
            .book
            .get(instruction_id)
            .map(|r| r.instruction.clone())
    }

    /// Re-mint a request's burned shares and mark it rolled back.
    fn remint_burn(
        balances: &mut ShareBalanceTable,
        request: &mut PendingRequest,
    ) -> Result<(), LedgerError> {
        for (vault_id, amount) in &request.burned {
            balances.mint(request.instruction.requester, *vault_id, *amount)?;
        }
        request.rolled_back = true;
        Ok(())
    }
}

#[async_trait]
impl<B, D> LedgerApi for ShareLedger<B, D>
where
    B: AssetBridge,
    D: InstructionDispatcher,
{
    async fn request_deposit(
        &self,
        requester: Address,
        entries: Vec<DepositEntry>,
        target_domain: DomainId,
    ) -> Result<InstructionId, LedgerError> {
        let mut instruction = Instruction {
            id: 0,
            kind: TxKind::Deposit,
            source_domain: self.config.domain,
            dest_domain: target_domain,
            requester,
            vault_ids: entries.iter().map(|e| e.vault_id).collect(),
            amounts: entries.iter().map(|e| e.amount).collect(),
            slippage_bps: entries.iter().map(|e| e.slippage_bps).collect(),
            extra: Vec::new(),
            fee_budget: self.config.default_fee_budget,
            status: InstructionStatus::Pending,
        };
        instruction.validate()?;

        {
            let mut state = self.state.write();
            for entry in &entries {
                if let Some(registered) = state.vault_domains.get(&entry.vault_id) {
                    if *registered != target_domain {
                        return Err(LedgerError::VaultDomainMismatch {
                            vault_id: entry.vault_id,
                            registered: *registered,
                            requested: target_domain,
                        });
                    }
                }
            }
            instruction.id = state.book.allocate_id();
        }

        // Assets go into bridge custody before the instruction leaves; a
        // destination failure leaves them there pending retry.
        for entry in &entries {
            let receipt = self
                .bridge
                .move_assets(entry.asset, requester, target_domain, entry.amount)
                .await
                .map_err(|e| LedgerError::Bridge(e.to_string()))?;
            debug!(
                "[sv-03] bridged {} units of {} under receipt {}",
                entry.amount,
                hex::encode(entry.asset),
                receipt.id
            );
        }

        // Record before dispatch: a same-domain dispatch delivers the
        // acknowledgement synchronously and confirm must find the request.
        let id = instruction.id;
        let payload = WirePayload::Request {
            origin: self.config.identity,
            instruction: instruction.clone(),
        };
        self.state.write().book.insert(PendingRequest {
            instruction,
            burned: Vec::new(),
            rolled_back: false,
        });
        if let Err(e) = self
            .dispatcher
            .dispatch(self.config.identity, target_domain, payload)
            .await
        {
            self.state.write().book.remove(id);
            warn!("[sv-03] deposit instruction {} dispatch failed: {}", id, e);
            return Err(LedgerError::Dispatch(e.to_string()));
        }
        info!(
            "[sv-03] deposit instruction {} dispatched to domain {} ({} entries)",
            id,
            target_domain,
            entries.len()
        );
        Ok(id)
    }

    async fn request_withdraw(
        &self,
        requester: Address,
        entries: Vec<WithdrawEntry>,
    ) -> Result<InstructionId, LedgerError> {
        if entries.is_empty() {
            return Err(LedgerError::Malformed(InstructionError::Empty));
        }

        // The destination is wherever the batched vaults live; one domain
        // per instruction.
        let dest = {
            let state = self.state.read();
            let mut dest: Option<DomainId> = None;
            for entry in &entries {
                let domain = *state
                    .vault_domains
                    .get(&entry.vault_id)
                    .ok_or(LedgerError::UnknownVaultDomain(entry.vault_id))?;
                match dest {
                    None => dest = Some(domain),
                    Some(first) if first != domain => {
                        return Err(LedgerError::MixedDomains {
                            first,
                            second: domain,
                        });
                    }
                    Some(_) => {}
                }
            }
            match dest {
                Some(dest) => dest,
                None => return Err(LedgerError::Malformed(InstructionError::Empty)),
            }
        };

        let mut instruction = Instruction {
            id: 0,
            kind: TxKind::Withdraw,
            source_domain: self.config.domain,
            dest_domain: dest,
            requester,
            vault_ids: entries.iter().map(|e| e.vault_id).collect(),
            amounts: entries.iter().map(|e| e.shares).collect(),
            slippage_bps: entries.iter().map(|e| e.slippage_bps).collect(),
            extra: Vec::new(),
            fee_budget: self.config.default_fee_budget,
            status: InstructionStatus::Pending,
        };
        instruction.validate()?;

        let burn_list: Vec<(VaultId, Amount)> =
            entries.iter().map(|e| (e.vault_id, e.shares)).collect();
        {
            let mut guard = self.state.write();
            let state = &mut *guard;
            // Linearization point: burn before anything leaves the domain.
            state.balances.burn_batch(requester, &burn_list)?;
            instruction.id = state.book.allocate_id();
            state.book.insert(PendingRequest {
                instruction: instruction.clone(),
                burned: burn_list.clone(),
                rolled_back: false,
            });
        }

        let id = instruction.id;
        let payload = WirePayload::Request {
            origin: self.config.identity,
            instruction,
        };
        match self
            .dispatcher
            .dispatch(self.config.identity, dest, payload)
            .await
        {
            Ok(_) => {
                info!(
                    "[sv-03] withdraw instruction {} dispatched to domain {}, {} entries burned",
                    id,
                    dest,
                    burn_list.len()
                );
                Ok(id)
            }
            Err(e) => {
                // The request never left this domain; undo the acceptance.
                let mut guard = self.state.write();
                let state = &mut *guard;
                for (vault_id, amount) in &burn_list {
                    if let Err(mint_err) = state.balances.mint(requester, *vault_id, *amount) {
                        error!(
                            "[sv-03] failed to restore burned shares for vault {}: {}",
                            vault_id, mint_err
                        );
                    }
                }
                state.book.remove(id);
                warn!("[sv-03] withdraw instruction {} dispatch failed: {}", id, e);
                Err(LedgerError::Dispatch(e.to_string()))
            }
        }
    }

    async fn confirm(&self, outcome: ExecutionOutcome) -> Result<(), LedgerError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let request = state
            .book
            .get_mut(outcome.instruction_id)
            .ok_or(LedgerError::UnknownInstruction(outcome.instruction_id))?;

        if request.is_finalized() {
            debug!(
                "[sv-03] duplicate confirmation for instruction {}, ignoring",
                outcome.instruction_id
            );
            return Ok(());
        }
        if request.instruction.kind != outcome.kind {
            return Err(LedgerError::OutcomeMismatch {
                instruction_id: outcome.instruction_id,
                expected: request.instruction.kind,
                got: outcome.kind,
            });
        }

        match (request.instruction.kind, outcome.status) {
            (TxKind::Deposit, OutcomeStatus::Executed) => {
                let requester = request.instruction.requester;
                for entry in &outcome.entries {
                    state
                        .balances
                        .mint(requester, entry.vault_id, entry.units_out)?;
                }
                request.instruction.status = InstructionStatus::Executed;
                info!(
                    "[sv-03] deposit instruction {} confirmed, {} entries minted",
                    outcome.instruction_id,
                    outcome.entries.len()
                );
            }
            (TxKind::Deposit, OutcomeStatus::Failed) => {
                request.instruction.status = InstructionStatus::Failed;
                warn!(
                    "[sv-03] deposit instruction {} failed on destination; assets stay in bridge custody",
                    outcome.instruction_id
                );
            }
            (TxKind::Withdraw, OutcomeStatus::Executed) => {
                // Shares were burned at request acceptance.
                request.instruction.status = InstructionStatus::Executed;
                info!(
                    "[sv-03] withdraw instruction {} confirmed",
                    outcome.instruction_id
                );
            }
            (TxKind::Withdraw, OutcomeStatus::Failed) => {
                request.instruction.status = InstructionStatus::Failed;
                Self::remint_burn(&mut state.balances, request)?;
                warn!(
                    "[sv-03] withdraw instruction {} failed on destination; burned shares re-minted",
                    outcome.instruction_id
                );
            }
        }
        Ok(())
    }

    fn rollback_withdraw(&self, instruction_id: InstructionId) -> Result<(), LedgerError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let request = state
            .book
            .get_mut(instruction_id)
            .ok_or(LedgerError::UnknownInstruction(instruction_id))?;

        if request.instruction.kind != TxKind::Withdraw
            || request.instruction.status != InstructionStatus::Failed
            || request.rolled_back
        {
            return Err(LedgerError::NotRollbackable(instruction_id));
        }
        Self::remint_burn(&mut state.balances, request)?;
        info!(
            "[sv-03] withdraw instruction {} rolled back",
            instruction_id
        );
        Ok(())
    }

    fn balance_of(&self, user: &Address, vault_id: VaultId) -> Amount {
        self.state.read().balances.balance_of(user, vault_id)
    }

    fn instruction_status(&self, instruction_id: InstructionId) -> Option<InstructionStatus> {
        self.state.read().book.status(instruction_id)
    }
}
