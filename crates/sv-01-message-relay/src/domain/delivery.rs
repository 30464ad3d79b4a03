//! # Delivery Records
//!
//! Replay-protection bookkeeping for inbound messages. Each accepted
//! `(source domain, sender, nonce)` tuple gets exactly one record, and the
//! record's state machine is the authority on whether the message may still
//! be executed, retried, or administratively resolved.

use super::errors::RelayError;
use shared_types::payload::PayloadHash;
use shared_types::{Address, DomainId, Nonce};
use serde::{Deserialize, Serialize};

/// Delivery state machine per inbound message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Record created, execution in progress.
    #[default]
    Pending,
    /// Execution committed; re-delivery is a no-op.
    Executed,
    /// Execution failed; raw payload stored for retry.
    Failed,
    /// Administratively abandoned without execution.
    Resolved,
}

impl DeliveryStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Executed) => true,
            (Self::Pending, Self::Failed) => true,
            (Self::Failed, Self::Executed) => true, // retry succeeded
            (Self::Failed, Self::Resolved) => true, // force-resume
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Resolved)
    }
}

/// Identity of one inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryKey {
    /// Domain the message claims to come from.
    pub src_domain: DomainId,
    /// Transport-verified sender identity.
    pub sender: Address,
    /// Per-sender sequence number.
    pub nonce: Nonce,
}

/// Bookkeeping for one inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryRecord {
    /// Message identity.
    pub key: DeliveryKey,
    /// Current state.
    pub status: DeliveryStatus,
    /// SHA-256 of the raw payload as received.
    pub payload_hash: PayloadHash,
    /// Last failure reason, while status is `Failed`.
    pub failure: Option<String>,
}

impl DeliveryRecord {
    /// Create a record in `Pending` for a freshly accepted message.
    pub fn new(key: DeliveryKey, payload_hash: PayloadHash) -> Self {
        Self {
            key,
            status: DeliveryStatus::Pending,
            payload_hash,
            failure: None,
        }
    }

    /// Transition to a new state.
    pub fn transition_to(&mut self, next: DeliveryStatus) -> Result<(), RelayError> {
        if !self.status.can_transition_to(next) {
            return Err(RelayError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next != DeliveryStatus::Failed {
            self.failure = None;
        }
        Ok(())
    }

    /// Mark failed with a reason.
    pub fn mark_failed(&mut self, reason: String) -> Result<(), RelayError> {
        self.transition_to(DeliveryStatus::Failed)?;
        self.failure = Some(reason);
        Ok(())
    }
}

/// A payload whose execution failed, kept verbatim for retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedMessage {
    /// Message identity.
    pub key: DeliveryKey,
    /// Raw payload as received.
    pub payload: Vec<u8>,
    /// SHA-256 of `payload`.
    pub payload_hash: PayloadHash,
    /// Why execution failed.
    pub reason: String,
}
