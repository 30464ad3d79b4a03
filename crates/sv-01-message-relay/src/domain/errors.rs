//! # Relay Errors
//!
//! Authentication failures are returned to the caller and never persisted;
//! execution failures are captured as failed messages and never thrown past
//! `receive`.

use super::delivery::DeliveryStatus;
use shared_types::payload::CodecError;
use shared_types::{Action, Address, DomainId, Nonce};
use thiserror::Error;

/// Relay error types.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Inbound sender is not the trusted peer for its domain. Dropped, never
    /// stored; identity problems need configuration fixes, not retries.
    #[error("untrusted sender {} for domain {domain}", hex::encode(.sender))]
    UntrustedSender {
        /// Claimed source domain.
        domain: DomainId,
        /// Rejected identity.
        sender: Address,
    },

    /// Dispatch target has no trusted peer configured.
    #[error("untrusted destination domain {0}")]
    UntrustedDestination(DomainId),

    /// Inbound nonce skips ahead of the recorded window. Nothing is
    /// persisted; the transport may redeliver in order later.
    #[error("nonce gap from domain {domain}: expected {expected}, got {got}")]
    NonceGap {
        /// Source domain.
        domain: DomainId,
        /// Next acceptable nonce.
        expected: Nonce,
        /// Rejected nonce.
        got: Nonce,
    },

    /// Caller lacks the capability for an administrative action.
    #[error("caller {} lacks capability for {action:?}", hex::encode(.caller))]
    Unauthorized {
        /// Rejected caller.
        caller: Address,
        /// Action that was attempted.
        action: Action,
    },

    /// Retry or resume referenced a nonce that was never recorded.
    #[error("no delivery record for domain {domain} nonce {nonce}")]
    UnknownDelivery {
        /// Source domain.
        domain: DomainId,
        /// Unrecorded nonce.
        nonce: Nonce,
    },

    /// Retry referenced a record that is not in the `Failed` state.
    #[error("delivery for domain {domain} nonce {nonce} is {status:?}, not Failed")]
    NotFailed {
        /// Source domain.
        domain: DomainId,
        /// Referenced nonce.
        nonce: Nonce,
        /// Actual record state.
        status: DeliveryStatus,
    },

    /// Illegal delivery state transition.
    #[error("invalid delivery transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current state.
        from: DeliveryStatus,
        /// Attempted state.
        to: DeliveryStatus,
    },

    /// Outbound payload could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The transport refused or failed the send.
    #[error("transport error: {0}")]
    Transport(String),
}
