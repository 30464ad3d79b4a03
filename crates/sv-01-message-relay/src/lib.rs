//! # SV-01 Message Relay
//!
//! Cross-domain message relay for the SpanVault protocol.
//!
//! ## Purpose
//!
//! Carry vault instructions between execution domains exactly once:
//! - Per-destination monotonic sequence numbers on dispatch
//! - Trusted-peer authentication on receipt
//! - Replay protection keyed by (source domain, sender, nonce)
//! - Failed-message capture with retry and audited force-resume
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Exactly-once execution | Delivery record per nonce, duplicate no-op |
//! | Ordered processing | Contiguous-nonce window per sender |
//! | No lost payloads | Execution failures persisted for retry |
//! | Authenticated peers | Trust registry checked before any side effect |
//!
//! ## Module Structure
//!
//! ```text
//! sv-01-message-relay/
//! ├── domain/          # DeliveryRecord, TrustRegistry, invariants, errors
//! ├── ports/           # MessageEndpoint, MessageTransport, execution sinks
//! ├── adapters/        # In-memory transport for tests and local wiring
//! └── service.rs       # MessageRelay
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryTransport;
pub use domain::{
    DeliveryKey, DeliveryRecord, DeliveryStatus, FailedMessage, RelayError, TrustRegistry,
};
pub use ports::{
    HandlerError, InstructionExecutor, MessageEndpoint, MessageTransport, OutcomeHandler,
    ReceiveStatus, TransportEnvelope, TransportError,
};
pub use service::{MessageRelay, RelayConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
