//! # SV-02 Vault Gateway
//!
//! Destination-side execution for the SpanVault protocol.
//!
//! ## Purpose
//!
//! Turn verified forward instructions into real vault operations:
//! - Vault registry: (vault id -> opaque vault handle), domain-scoped
//! - Second authorization layer: per-domain source distributors, beneath the
//!   relay's transport-identity check
//! - All-or-nothing batches: a failure on any entry unwinds every committed
//!   entry before the error surfaces
//! - Outcome history consumed by the relay for the return trip
//!
//! ## Module Structure
//!
//! ```text
//! sv-02-vault-gateway/
//! ├── domain/          # BatchEntry, errors
//! ├── ports/           # GatewayApi, VaultHandle
//! ├── adapters/        # MockVault
//! └── service.rs       # VaultGateway
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::MockVault;
pub use domain::{batch_entries, BatchEntry, GatewayError};
pub use ports::{GatewayApi, VaultError, VaultHandle};
pub use service::{GatewayConfig, VaultGateway};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
