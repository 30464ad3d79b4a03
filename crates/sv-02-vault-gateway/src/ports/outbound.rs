//! # Outbound Ports
//!
//! The vault handle capability: one opaque handle per registered vault,
//! exposing deposit, withdraw, and redemption preview. Conversion between
//! asset amounts and vault shares (including rounding) belongs to the vault;
//! the gateway never recomputes it.

use async_trait::async_trait;
use shared_types::Amount;
use thiserror::Error;

/// Vault-side operation failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    /// Vault cannot pay out the requested assets.
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        /// Assets the redemption needs.
        requested: Amount,
        /// Assets the vault can pay now.
        available: Amount,
    },

    /// Vault refused the operation.
    #[error("vault rejected operation: {0}")]
    Rejected(String),
}

/// Opaque capability over one vault - outbound port.
#[async_trait]
pub trait VaultHandle: Send + Sync {
    /// Deposit assets; returns vault shares minted.
    async fn deposit(&self, amount: Amount) -> Result<Amount, VaultError>;

    /// Redeem vault shares; returns assets paid out.
    async fn withdraw(&self, shares: Amount) -> Result<Amount, VaultError>;

    /// Assets a redemption of `shares` would currently return.
    async fn preview_redeem(&self, shares: Amount) -> Result<Amount, VaultError>;
}
