//! # Vault Gateway Service
//!
//! Owns the vault registry and the received-instruction history for one
//! domain, and executes batched instructions all-or-nothing: a failure on
//! any entry unwinds every committed entry through the inverse vault
//! operation before the error surfaces to the relay.

use crate::domain::{batch_entries, BatchEntry, GatewayError};
use crate::ports::inbound::GatewayApi;
use crate::ports::outbound::{VaultError, VaultHandle};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    slippage_floor, Action, Address, Amount, CapabilityGuard, DomainId, EntryOutcome,
    ExecutionOutcome, Instruction, InstructionId, InstructionStatus, OutcomeStatus, TxKind,
    VaultId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Per-domain gateway configuration.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Domain this gateway executes vaults on.
    pub domain: DomainId,
}

/// History entry for an instruction received on this gateway.
#[derive(Clone, Debug)]
struct InstructionRecord {
    /// The instruction, with its destination-side lifecycle status.
    instruction: Instruction,
    /// Present once the batch committed.
    outcome: Option<ExecutionOutcome>,
}

/// Tables owned by the gateway. Single writer: this gateway.
struct GatewayState {
    vaults: HashMap<VaultId, Arc<dyn VaultHandle>>,
    distributors: HashMap<DomainId, Address>,
    history: HashMap<(DomainId, InstructionId), InstructionRecord>,
}

/// Vault gateway for one domain.
pub struct VaultGateway {
    config: GatewayConfig,
    state: RwLock<GatewayState>,
    guard: Arc<dyn CapabilityGuard>,
}

impl VaultGateway {
    /// Create a gateway with an empty registry.
    pub fn new(config: GatewayConfig, guard: Arc<dyn CapabilityGuard>) -> Self {
        Self {
            config,
            state: RwLock::new(GatewayState {
                vaults: HashMap::new(),
                distributors: HashMap::new(),
                history: HashMap::new(),
            }),
            guard,
        }
    }

    /// Domain this gateway serves.
    pub fn domain(&self) -> DomainId {
        self.config.domain
    }

    fn check_capability(&self, caller: &Address, action: Action) -> Result<(), GatewayError> {
        if !self.guard.has_capability(caller, action) {
            return Err(GatewayError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Authorization and registry resolution, before any side effect.
    fn stage(
        &self,
        src_domain: DomainId,
        origin: Address,
        instruction: &Instruction,
    ) -> Result<StagedBatch, GatewayError> {
        instruction.validate()?;
        if instruction.source_domain != src_domain {
            return Err(GatewayError::SourceMismatch {
                claimed: instruction.source_domain,
                verified: src_domain,
            });
        }
        if instruction.dest_domain != self.config.domain {
            return Err(GatewayError::WrongDestination {
                addressed: instruction.dest_domain,
                local: self.config.domain,
            });
        }

        let key = (src_domain, instruction.id);
        let mut state = self.state.write();
        if let Some(record) = state.history.get(&key) {
            if let Some(outcome) = &record.outcome {
                debug!(
                    "[sv-02] instruction {} from domain {} already executed",
                    instruction.id, src_domain
                );
                return Ok(StagedBatch::AlreadyExecuted(outcome.clone()));
            }
        }

        match state.distributors.get(&src_domain) {
            None => return Err(GatewayError::UnknownSourceDomain(src_domain)),
            Some(expected) if *expected != origin => {
                return Err(GatewayError::UntrustedOriginator {
                    domain: src_domain,
                    origin,
                });
            }
            Some(_) => {}
        }

        let mut staged = Vec::new();
        for entry in batch_entries(instruction) {
            let handle = state
                .vaults
                .get(&entry.vault_id)
                .cloned()
                .ok_or(GatewayError::UnknownVault(entry.vault_id))?;
            staged.push((entry, handle));
        }

        let mut delivered = instruction.clone();
        delivered.status = InstructionStatus::Delivered;
        state.history.insert(
            key,
            InstructionRecord {
                instruction: delivered,
                outcome: None,
            },
        );
        Ok(StagedBatch::Ready(staged))
    }

    /// Run one entry; on a slippage miss, the committed vault operation is
    /// pulled back out before the error returns.
    async fn execute_entry(
        &self,
        kind: TxKind,
        entry: &BatchEntry,
        handle: &Arc<dyn VaultHandle>,
    ) -> Result<Amount, GatewayError> {
        let vault_failed = |e: VaultError| GatewayError::ExecutionFailed {
            vault_id: entry.vault_id,
            reason: e.to_string(),
        };
        match kind {
            TxKind::Deposit => {
                let minted = handle.deposit(entry.amount).await.map_err(vault_failed)?;
                let floor = slippage_floor(entry.amount, entry.slippage_bps);
                if minted < floor {
                    if let Err(e) = handle.withdraw(minted).await {
                        error!(
                            "[sv-02] unwind of slippage-failed deposit to vault {} failed: {}",
                            entry.vault_id, e
                        );
                    }
                    return Err(GatewayError::SlippageExceeded {
                        vault_id: entry.vault_id,
                        minimum: floor,
                        got: minted,
                    });
                }
                Ok(minted)
            }
            TxKind::Withdraw => {
                let expected = handle
                    .preview_redeem(entry.amount)
                    .await
                    .map_err(vault_failed)?;
                let floor = slippage_floor(expected, entry.slippage_bps);
                let assets = handle.withdraw(entry.amount).await.map_err(vault_failed)?;
                if assets < floor {
                    if let Err(e) = handle.deposit(assets).await {
                        error!(
                            "[sv-02] unwind of slippage-failed withdraw from vault {} failed: {}",
                            entry.vault_id, e
                        );
                    }
                    return Err(GatewayError::SlippageExceeded {
                        vault_id: entry.vault_id,
                        minimum: floor,
                        got: assets,
                    });
                }
                Ok(assets)
            }
        }
    }

    /// Undo committed entries in reverse order.
    async fn unwind(&self, kind: TxKind, committed: &[(BatchEntry, Amount, Arc<dyn VaultHandle>)]) {
        for (entry, units_out, handle) in committed.iter().rev() {
            let result = match kind {
                TxKind::Deposit => handle.withdraw(*units_out).await.map(|_| ()),
                TxKind::Withdraw => handle.deposit(*units_out).await.map(|_| ()),
            };
            if let Err(e) = result {
                error!(
                    "[sv-02] unwind of vault {} failed, manual reconciliation needed: {}",
                    entry.vault_id, e
                );
            }
        }
    }

    fn finalize(&self, key: (DomainId, InstructionId), result: &Result<ExecutionOutcome, GatewayError>) {
        let mut state = self.state.write();
        if let Some(record) = state.history.get_mut(&key) {
            match result {
                Ok(outcome) => {
                    record.instruction.status = InstructionStatus::Executed;
                    record.outcome = Some(outcome.clone());
                }
                Err(_) => {
                    record.instruction.status = InstructionStatus::Failed;
                }
            }
        }
    }
}

/// Result of staging: either the batch to run, or the recorded outcome.
enum StagedBatch {
    Ready(Vec<(BatchEntry, Arc<dyn VaultHandle>)>),
    AlreadyExecuted(ExecutionOutcome),
}

#[async_trait]
impl GatewayApi for VaultGateway {
    fn register_vault(
        &self,
        caller: &Address,
        vault_id: VaultId,
        handle: Arc<dyn VaultHandle>,
    ) -> Result<(), GatewayError> {
        self.check_capability(caller, Action::RegisterVault)?;
        self.state.write().vaults.insert(vault_id, handle);
        info!(
            "[sv-02] vault {} registered on domain {}",
            vault_id, self.config.domain
        );
        Ok(())
    }

    fn set_source_distributor(
        &self,
        caller: &Address,
        domain: DomainId,
        identity: Address,
    ) -> Result<(), GatewayError> {
        self.check_capability(caller, Action::SetSourceDistributor)?;
        self.state.write().distributors.insert(domain, identity);
        info!(
            "[sv-02] source distributor for domain {} set to {}",
            domain,
            hex::encode(identity)
        );
        Ok(())
    }

    async fn execute(
        &self,
        src_domain: DomainId,
        origin: Address,
        instruction: Instruction,
    ) -> Result<ExecutionOutcome, GatewayError> {
        let staged = match self.stage(src_domain, origin, &instruction)? {
            StagedBatch::AlreadyExecuted(outcome) => return Ok(outcome),
            StagedBatch::Ready(staged) => staged,
        };
        let key = (src_domain, instruction.id);
        debug!(
            "[sv-02] executing instruction {} from domain {}: {} entries",
            instruction.id,
            src_domain,
            staged.len()
        );

        let mut committed: Vec<(BatchEntry, Amount, Arc<dyn VaultHandle>)> = Vec::new();
        let mut entries = Vec::new();
        for (entry, handle) in staged {
            match self.execute_entry(instruction.kind, &entry, &handle).await {
                Ok(units_out) => {
                    entries.push(EntryOutcome {
                        vault_id: entry.vault_id,
                        amount_in: entry.amount,
                        units_out,
                    });
                    committed.push((entry, units_out, handle));
                }
                Err(e) => {
                    warn!(
                        "[sv-02] entry {} of instruction {} failed, unwinding {} committed entries: {}",
                        entry.index,
                        instruction.id,
                        committed.len(),
                        e
                    );
                    self.unwind(instruction.kind, &committed).await;
                    let result = Err(e);
                    self.finalize(key, &result);
                    return result;
                }
            }
        }

        let outcome = ExecutionOutcome {
            instruction_id: instruction.id,
            kind: instruction.kind,
            source_domain: src_domain,
            entries,
            status: OutcomeStatus::Executed,
        };
        let result = Ok(outcome.clone());
        self.finalize(key, &result);
        info!(
            "[sv-02] executed instruction {} from domain {} ({} entries)",
            instruction.id,
            src_domain,
            outcome.entries.len()
        );
        Ok(outcome)
    }

    fn outcome_of(
        &self,
        source_domain: DomainId,
        instruction_id: InstructionId,
    ) -> Option<ExecutionOutcome> {
        self.state
            .read()
            .history
            .get(&(source_domain, instruction_id))
            .and_then(|record| record.outcome.clone())
    }

    fn is_executed(&self, source_domain: DomainId, instruction_id: InstructionId) -> bool {
        self.outcome_of(source_domain, instruction_id).is_some()
    }

    fn has_vault(&self, vault_id: VaultId) -> bool {
        self.state.read().vaults.contains_key(&vault_id)
    }
}

impl VaultGateway {
    /// The received instruction with its destination-side status, if any.
    pub fn received_instruction(
        &self,
        source_domain: DomainId,
        instruction_id: InstructionId,
    ) -> Option<Instruction> {
        self.state
            .read()
            .history
            .get(&(source_domain, instruction_id))
            .map(|record| record.instruction.clone())
    }
}
