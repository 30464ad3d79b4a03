//! # SV-03 Share Ledger
//!
//! Source-side accounting for the SpanVault protocol.
//!
//! ## Purpose
//!
//! Convert user deposit/withdraw requests into cross-domain instructions and
//! reconcile per-user per-vault accounting units against confirmed outcomes:
//! - Deposits mint nothing until the destination confirms execution
//! - Withdraws burn at request acceptance (no double-withdraw races)
//! - Confirmed failures roll a withdraw's burn back exactly
//! - Asset movement is delegated to the bridge capability; the ledger never
//!   moves tokens itself
//!
//! ## Module Structure
//!
//! ```text
//! sv-03-share-ledger/
//! ├── domain/          # ShareBalanceTable, RequestBook, errors
//! ├── ports/           # LedgerApi, AssetBridge, InstructionDispatcher
//! ├── adapters/        # MockBridge
//! └── service.rs       # ShareLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::MockBridge;
pub use domain::{BalanceError, LedgerError, PendingRequest, RequestBook, ShareBalanceTable};
pub use ports::{
    AssetBridge, BridgeError, BridgeReceipt, DepositEntry, DispatchError, InstructionDispatcher,
    LedgerApi, WithdrawEntry,
};
pub use service::{LedgerConfig, ShareLedger};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
