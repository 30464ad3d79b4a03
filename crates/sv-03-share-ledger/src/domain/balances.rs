//! # Share Balance Table
//!
//! Ledger-side accounting units per (user, vault). These are the protocol's
//! own proxy units, not any vault's native share token; they mutate only
//! through the owning ledger, on request acceptance and on confirmation.

use shared_types::{Address, Amount, VaultId};
use std::collections::HashMap;
use thiserror::Error;

/// Balance mutation failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    /// Burn exceeds the holder's balance.
    #[error("insufficient shares in vault {vault_id}: have {have}, need {need}")]
    InsufficientShares {
        /// Vault the burn targeted.
        vault_id: VaultId,
        /// Balance actually held.
        have: Amount,
        /// Amount the burn needed.
        need: Amount,
    },

    /// Mint would overflow the balance counter.
    #[error("share balance overflow in vault {vault_id}")]
    Overflow {
        /// Vault whose balance overflowed.
        vault_id: VaultId,
    },
}

/// (user, vault) -> accounting units, plus a per-vault issuance counter.
#[derive(Clone, Debug, Default)]
pub struct ShareBalanceTable {
    balances: HashMap<(Address, VaultId), Amount>,
    issued: HashMap<VaultId, Amount>,
}

impl ShareBalanceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units held by `user` in `vault_id`.
    pub fn balance_of(&self, user: &Address, vault_id: VaultId) -> Amount {
        self.balances.get(&(*user, vault_id)).copied().unwrap_or(0)
    }

    /// Units outstanding across all holders of `vault_id` (minted - burned).
    pub fn total_issued(&self, vault_id: VaultId) -> Amount {
        self.issued.get(&vault_id).copied().unwrap_or(0)
    }

    /// Mint units to a holder.
    pub fn mint(
        &mut self,
        user: Address,
        vault_id: VaultId,
        amount: Amount,
    ) -> Result<(), BalanceError> {
        let balance = self.balances.entry((user, vault_id)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(BalanceError::Overflow { vault_id })?;
        let issued = self.issued.entry(vault_id).or_insert(0);
        *issued = issued
            .checked_add(amount)
            .ok_or(BalanceError::Overflow { vault_id })?;
        Ok(())
    }

    /// Burn units from a holder.
    pub fn burn(
        &mut self,
        user: Address,
        vault_id: VaultId,
        amount: Amount,
    ) -> Result<(), BalanceError> {
        let have = self.balance_of(&user, vault_id);
        let remaining = have
            .checked_sub(amount)
            .ok_or(BalanceError::InsufficientShares {
                vault_id,
                have,
                need: amount,
            })?;
        if remaining == 0 {
            self.balances.remove(&(user, vault_id));
        } else {
            self.balances.insert((user, vault_id), remaining);
        }
        if let Some(issued) = self.issued.get_mut(&vault_id) {
            *issued = issued.saturating_sub(amount);
        }
        Ok(())
    }

    /// Burn several entries for one holder, all or none: every entry is
    /// checked against the current balance before any is applied.
    pub fn burn_batch(
        &mut self,
        user: Address,
        entries: &[(VaultId, Amount)],
    ) -> Result<(), BalanceError> {
        let mut needed: HashMap<VaultId, Amount> = HashMap::new();
        for (vault_id, amount) in entries {
            *needed.entry(*vault_id).or_insert(0) += amount;
        }
        for (vault_id, need) in &needed {
            let have = self.balance_of(&user, *vault_id);
            if have < *need {
                return Err(BalanceError::InsufficientShares {
                    vault_id: *vault_id,
                    have,
                    need: *need,
                });
            }
        }
        for (vault_id, amount) in entries {
            self.burn(user, *vault_id, *amount)?;
        }
        Ok(())
    }
}
