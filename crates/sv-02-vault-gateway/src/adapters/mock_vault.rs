//! # Mock Vault
//!
//! In-memory vault implementing the `VaultHandle` port with proportional
//! share accounting: first deposit mints 1:1, later operations convert at
//! `total_assets / total_shares`. Yield accrual and a liquidity cap make
//! slippage and illiquidity failures reproducible.

use crate::ports::outbound::{VaultError, VaultHandle};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Amount;
use tracing::debug;

struct MockVaultState {
    total_assets: Amount,
    total_shares: Amount,
    /// Assets available for immediate redemption.
    liquidity: Amount,
    fail_deposits: bool,
    fail_withdraws: bool,
}

/// In-memory vault for testing.
pub struct MockVault {
    state: RwLock<MockVaultState>,
}

impl MockVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MockVaultState {
                total_assets: 0,
                total_shares: 0,
                liquidity: 0,
                fail_deposits: false,
                fail_withdraws: false,
            }),
        }
    }

    /// Total assets under management.
    pub fn total_assets(&self) -> Amount {
        self.state.read().total_assets
    }

    /// Total vault shares outstanding.
    pub fn total_shares(&self) -> Amount {
        self.state.read().total_shares
    }

    /// Add assets without minting shares, raising the share price.
    pub fn accrue_yield(&self, amount: Amount) {
        let mut state = self.state.write();
        state.total_assets += amount;
        state.liquidity += amount;
    }

    /// Cap the assets available for redemption.
    pub fn set_liquidity(&self, amount: Amount) {
        self.state.write().liquidity = amount;
    }

    /// Make every deposit fail.
    pub fn set_fail_deposits(&self, fail: bool) {
        self.state.write().fail_deposits = fail;
    }

    /// Make every withdraw fail.
    pub fn set_fail_withdraws(&self, fail: bool) {
        self.state.write().fail_withdraws = fail;
    }

    fn redeem_value(state: &MockVaultState, shares: Amount) -> Result<Amount, VaultError> {
        if shares > state.total_shares {
            return Err(VaultError::Rejected(format!(
                "redeem of {} shares exceeds supply {}",
                shares, state.total_shares
            )));
        }
        if state.total_shares == 0 {
            return Ok(0);
        }
        Ok(shares * state.total_assets / state.total_shares)
    }
}

impl Default for MockVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultHandle for MockVault {
    async fn deposit(&self, amount: Amount) -> Result<Amount, VaultError> {
        let mut state = self.state.write();
        if state.fail_deposits {
            return Err(VaultError::Rejected("deposits disabled".to_string()));
        }
        let shares = if state.total_shares == 0 {
            amount
        } else {
            amount * state.total_shares / state.total_assets
        };
        state.total_assets += amount;
        state.liquidity += amount;
        state.total_shares += shares;
        debug!("[sv-02] mock vault deposit {} -> {} shares", amount, shares);
        Ok(shares)
    }

    async fn withdraw(&self, shares: Amount) -> Result<Amount, VaultError> {
        let mut state = self.state.write();
        if state.fail_withdraws {
            return Err(VaultError::Rejected("withdraws disabled".to_string()));
        }
        let assets = Self::redeem_value(&state, shares)?;
        if assets > state.liquidity {
            return Err(VaultError::InsufficientLiquidity {
                requested: assets,
                available: state.liquidity,
            });
        }
        state.total_shares -= shares;
        state.total_assets -= assets;
        state.liquidity -= assets;
        debug!("[sv-02] mock vault withdraw {} shares -> {}", shares, assets);
        Ok(assets)
    }

    async fn preview_redeem(&self, shares: Amount) -> Result<Amount, VaultError> {
        let state = self.state.read();
        Self::redeem_value(&state, shares)
    }
}
