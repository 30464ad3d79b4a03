//! # Domain Entities
//!
//! The gateway works on an instruction's parallel entry vectors as a list of
//! typed batch entries.

use shared_types::{Amount, Instruction, VaultId};

/// One vault operation inside a batched instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchEntry {
    /// Position in the batch.
    pub index: usize,
    /// Target vault.
    pub vault_id: VaultId,
    /// Asset amount (deposit) or shares (withdraw).
    pub amount: Amount,
    /// Slippage bound in basis points.
    pub slippage_bps: u16,
}

/// Zip an instruction's parallel vectors into typed entries.
///
/// Callers must have validated the instruction shape first; mismatched
/// lengths here would silently truncate.
pub fn batch_entries(instruction: &Instruction) -> Vec<BatchEntry> {
    instruction
        .vault_ids
        .iter()
        .zip(instruction.amounts.iter())
        .zip(instruction.slippage_bps.iter())
        .enumerate()
        .map(|(index, ((vault_id, amount), slippage_bps))| BatchEntry {
            index,
            vault_id: *vault_id,
            amount: *amount,
            slippage_bps: *slippage_bps,
        })
        .collect()
}
