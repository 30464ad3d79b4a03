//! # Inbound Port
//!
//! The entry point the external transport invokes to deliver a message.
//! It must be safe to call with a duplicate or out-of-order nonce.

use crate::domain::RelayError;
use async_trait::async_trait;
use shared_types::{Address, DomainId, Nonce};

/// What `on_message` did with a delivery. Execution failures are captured,
/// not raised, so the transport never retry-duplicates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiveStatus {
    /// Forward instruction executed; acknowledgement dispatched.
    Executed,
    /// Return acknowledgement applied to the ledger.
    Confirmed,
    /// Nonce already recorded; nothing happened.
    Duplicate,
    /// Execution failed; payload persisted for retry.
    Stored,
}

/// Transport-facing message endpoint.
#[async_trait]
pub trait MessageEndpoint: Send + Sync {
    /// Deliver one message from the transport.
    ///
    /// # Errors
    ///
    /// - [`RelayError::UntrustedSender`] - dropped, nothing persisted
    /// - [`RelayError::NonceGap`] - rejected, may be redelivered in order
    async fn on_message(
        &self,
        src_domain: DomainId,
        sender: Address,
        nonce: Nonce,
        payload: Vec<u8>,
    ) -> Result<ReceiveStatus, RelayError>;
}
