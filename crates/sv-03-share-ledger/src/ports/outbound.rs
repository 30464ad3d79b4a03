//! # Outbound Ports
//!
//! The two capabilities the ledger delegates to: the liquidity bridge that
//! physically moves assets between domains, and the relay dispatch surface.
//! Both are external collaborators; the ledger only specifies what it needs
//! from them.

use async_trait::async_trait;
use shared_types::{Address, Amount, DomainId, Nonce, WirePayload};
use thiserror::Error;
use uuid::Uuid;

/// Bridge adapter failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// Bridge route unavailable.
    #[error("bridge unavailable: {0}")]
    Unavailable(String),

    /// Bridge refused the transfer.
    #[error("bridge rejected transfer: {0}")]
    Rejected(String),
}

/// Proof of custody for one asset movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeReceipt {
    /// Bridge-assigned transfer id.
    pub id: Uuid,
    /// Asset moved.
    pub asset: Address,
    /// Amount moved.
    pub amount: Amount,
}

/// Liquidity bridge capability - outbound port.
#[async_trait]
pub trait AssetBridge: Send + Sync {
    /// Move `amount` of `asset` from `from` into bridge custody bound for
    /// `dest_domain`.
    async fn move_assets(
        &self,
        asset: Address,
        from: Address,
        dest_domain: DomainId,
        amount: Amount,
    ) -> Result<BridgeReceipt, BridgeError>;
}

/// Dispatch failures, as the ledger sees them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The relay rejected the caller.
    #[error("dispatch unauthorized")]
    Unauthorized,

    /// The relay has no trusted peer for the destination.
    #[error("untrusted destination domain {0}")]
    UntrustedDestination(DomainId),

    /// The transport failed the send.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Relay dispatch capability - outbound port.
#[async_trait]
pub trait InstructionDispatcher: Send + Sync {
    /// Hand a payload to the relay for a destination domain.
    async fn dispatch(
        &self,
        caller: Address,
        dest: DomainId,
        payload: WirePayload,
    ) -> Result<Nonce, DispatchError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Dispatcher that records payloads instead of relaying them.
#[derive(Default)]
pub struct RecordingDispatcher {
    /// Dispatched payloads, in order.
    pub sent: parking_lot::Mutex<Vec<(DomainId, WirePayload)>>,
    /// Fail every call?
    pub should_fail: bool,
}

#[async_trait]
impl InstructionDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        _caller: Address,
        dest: DomainId,
        payload: WirePayload,
    ) -> Result<Nonce, DispatchError> {
        if self.should_fail {
            return Err(DispatchError::Transport("mock failure".to_string()));
        }
        let mut sent = self.sent.lock();
        sent.push((dest, payload));
        Ok(sent.len() as Nonce)
    }
}
