//! # Domain Layer
//!
//! Delivery records, trusted peers, invariants, and errors for the relay.

pub mod delivery;
pub mod errors;
pub mod invariants;
pub mod trust;

pub use delivery::{DeliveryKey, DeliveryRecord, DeliveryStatus, FailedMessage};
pub use errors::RelayError;
pub use invariants::{invariant_nonce_contiguous, invariant_sender_trusted, next_expected};
pub use trust::TrustRegistry;
