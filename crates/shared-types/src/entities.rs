//! # Protocol Entities
//!
//! Instruction and outcome types exchanged between the relay, gateway, and
//! ledger subsystems.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Execution domain identifier (one chain / one sequential context).
pub type DomainId = u16;

/// Application-level identity (20-byte).
pub type Address = [u8; 20];

/// Vault identifier, scoped to a single domain.
pub type VaultId = u64;

/// Token amount in the asset's smallest unit.
pub type Amount = u128;

/// Instruction identifier, monotonic per source domain.
pub type InstructionId = u64;

/// Per-sender monotonic sequence number.
pub type Nonce = u64;

/// Basis points denominator for slippage bounds.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Direction of a cross-domain vault instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    /// Move assets into a vault; shares are minted on confirmation.
    Deposit,
    /// Redeem shares from a vault; shares are burned on request.
    Withdraw,
}

/// Instruction lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionStatus {
    /// Dispatched from the source domain, no confirmation yet.
    #[default]
    Pending,
    /// Received on the destination domain, execution in progress.
    Delivered,
    /// Execution confirmed successful.
    Executed,
    /// Execution confirmed failed.
    Failed,
}

impl InstructionStatus {
    /// Check if this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Failed)
    }
}

/// A cross-domain request batching one or more vault operations.
///
/// `vault_ids`, `amounts`, and `slippage_bps` are parallel sequences: entry
/// `i` of each describes the i-th vault operation. For deposits `amounts`
/// holds asset amounts; for withdraws it holds ledger shares to redeem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Monotonic identifier, unique per source domain.
    pub id: InstructionId,
    /// Deposit or withdraw.
    pub kind: TxKind,
    /// Domain the request originated on.
    pub source_domain: DomainId,
    /// Domain that executes against real vaults.
    pub dest_domain: DomainId,
    /// User the shares are accounted to.
    pub requester: Address,
    /// Target vaults, one per entry.
    pub vault_ids: Vec<VaultId>,
    /// Asset amounts (deposit) or shares (withdraw), one per entry.
    pub amounts: Vec<Amount>,
    /// Per-entry slippage bound in basis points.
    pub slippage_bps: Vec<u16>,
    /// Opaque forwarding parameters, untouched by the core.
    pub extra: Vec<u8>,
    /// Fee allowance for the return trip; opaque to the core.
    pub fee_budget: Amount,
    /// Lifecycle status, maintained by the owning domain.
    pub status: InstructionStatus,
}

/// Instruction shape violations, caught before any side effect.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InstructionError {
    /// The parallel entry vectors differ in length.
    #[error("entry vectors differ in length: {vaults} vaults, {amounts} amounts, {slippages} slippage bounds")]
    UnevenEntries {
        /// Number of vault ids.
        vaults: usize,
        /// Number of amounts.
        amounts: usize,
        /// Number of slippage bounds.
        slippages: usize,
    },

    /// The instruction batches zero vault operations.
    #[error("instruction has no vault entries")]
    Empty,

    /// An entry carries a zero amount.
    #[error("entry {entry} has zero amount")]
    ZeroAmount {
        /// Offending entry index.
        entry: usize,
    },

    /// An entry's slippage bound exceeds 100%.
    #[error("entry {entry} slippage {bps} bps exceeds {max} bps", max = BPS_DENOMINATOR)]
    SlippageOutOfRange {
        /// Offending entry index.
        entry: usize,
        /// Declared bound.
        bps: u16,
    },
}

impl Instruction {
    /// Validate the parallel-entry invariant and per-entry bounds.
    pub fn validate(&self) -> Result<(), InstructionError> {
        if self.vault_ids.len() != self.amounts.len()
            || self.vault_ids.len() != self.slippage_bps.len()
        {
            return Err(InstructionError::UnevenEntries {
                vaults: self.vault_ids.len(),
                amounts: self.amounts.len(),
                slippages: self.slippage_bps.len(),
            });
        }
        if self.vault_ids.is_empty() {
            return Err(InstructionError::Empty);
        }
        for (i, amount) in self.amounts.iter().enumerate() {
            if *amount == 0 {
                return Err(InstructionError::ZeroAmount { entry: i });
            }
        }
        for (i, bps) in self.slippage_bps.iter().enumerate() {
            if u64::from(*bps) > BPS_DENOMINATOR {
                return Err(InstructionError::SlippageOutOfRange {
                    entry: i,
                    bps: *bps,
                });
            }
        }
        Ok(())
    }

    /// Number of vault operations batched in this instruction.
    pub fn entry_count(&self) -> usize {
        self.vault_ids.len()
    }
}

/// Minimum acceptable output for an entry under its slippage bound.
///
/// `amount * (10_000 - slippage_bps) / 10_000`, rounded down.
pub fn slippage_floor(amount: Amount, slippage_bps: u16) -> Amount {
    let keep = BPS_DENOMINATOR.saturating_sub(u64::from(slippage_bps));
    amount / Amount::from(BPS_DENOMINATOR) * Amount::from(keep)
        + amount % Amount::from(BPS_DENOMINATOR) * Amount::from(keep) / Amount::from(BPS_DENOMINATOR)
}

/// Result of one vault operation inside a batched instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOutcome {
    /// Vault the entry executed against.
    pub vault_id: VaultId,
    /// Input units (assets deposited or shares redeemed).
    pub amount_in: Amount,
    /// Output units reported by the vault (shares minted or assets returned).
    pub units_out: Amount,
}

/// Terminal result of a batched instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// Every entry committed.
    Executed,
    /// Nothing committed; the batch was unwound or never ran.
    Failed,
}

/// Execution report for one instruction, built by the gateway and consumed
/// by the ledger on the return trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Instruction this outcome settles.
    pub instruction_id: InstructionId,
    /// Kind of the settled instruction.
    pub kind: TxKind,
    /// Domain that requested the execution.
    pub source_domain: DomainId,
    /// Per-entry results; empty when `status` is `Failed`.
    pub entries: Vec<EntryOutcome>,
    /// Whether the batch committed.
    pub status: OutcomeStatus,
}

impl ExecutionOutcome {
    /// Build a failure outcome carrying no entry results.
    pub fn failed(instruction_id: InstructionId, kind: TxKind, source_domain: DomainId) -> Self {
        Self {
            instruction_id,
            kind,
            source_domain,
            entries: Vec::new(),
            status: OutcomeStatus::Failed,
        }
    }
}
