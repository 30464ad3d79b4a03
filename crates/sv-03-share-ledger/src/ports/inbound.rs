//! # Inbound Port
//!
//! API trait defining what the ledger subsystem can do, plus the request
//! entry types users submit.

use crate::domain::LedgerError;
use async_trait::async_trait;
use shared_types::{
    Address, Amount, DomainId, ExecutionOutcome, InstructionId, InstructionStatus, VaultId,
};

/// One vault entry of a deposit request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositEntry {
    /// Vault to deposit into on the destination domain.
    pub vault_id: VaultId,
    /// Asset handed to the bridge adapter.
    pub asset: Address,
    /// Asset amount in smallest units.
    pub amount: Amount,
    /// Slippage bound in basis points.
    pub slippage_bps: u16,
}

/// One vault entry of a withdraw request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawEntry {
    /// Vault to redeem from.
    pub vault_id: VaultId,
    /// Ledger shares to burn and redeem.
    pub shares: Amount,
    /// Slippage bound in basis points.
    pub slippage_bps: u16,
}

/// Share ledger API - inbound port.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Move assets into bridge custody and dispatch a deposit instruction.
    /// No share mutation happens until the confirmation arrives.
    async fn request_deposit(
        &self,
        requester: Address,
        entries: Vec<DepositEntry>,
        target_domain: DomainId,
    ) -> Result<InstructionId, LedgerError>;

    /// Burn the requester's shares immediately (the linearization point
    /// against double-withdraws) and dispatch a withdraw instruction. The
    /// destination is the registered home domain of the batched vaults.
    async fn request_withdraw(
        &self,
        requester: Address,
        entries: Vec<WithdrawEntry>,
    ) -> Result<InstructionId, LedgerError>;

    /// Apply a confirmed outcome. Idempotent per instruction id.
    async fn confirm(&self, outcome: ExecutionOutcome) -> Result<(), LedgerError>;

    /// Re-mint the shares a confirmed-failed withdraw burned. Invoked
    /// automatically by `confirm`; valid at most once per instruction.
    fn rollback_withdraw(&self, instruction_id: InstructionId) -> Result<(), LedgerError>;

    /// Units held by `user` in `vault_id`.
    fn balance_of(&self, user: &Address, vault_id: VaultId) -> Amount;

    /// Lifecycle status of a dispatched instruction.
    fn instruction_status(&self, instruction_id: InstructionId) -> Option<InstructionStatus>;
}
