//! # Wire Payload Codec
//!
//! The single payload envelope carried by the external transport. A payload
//! is either a forward instruction (source ledger -> destination gateway) or
//! a return acknowledgement (destination gateway -> source ledger).
//!
//! Encoding is bincode; the codec is the only place raw transport bytes are
//! interpreted. Payload hashes (SHA-256) key failed-message bookkeeping.

use crate::entities::{Address, ExecutionOutcome, Instruction};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// 32-byte SHA-256 digest of an encoded payload.
pub type PayloadHash = [u8; 32];

/// Codec failures. A decode failure on receipt is an execution error, not an
/// authentication error: the raw bytes are persisted for later inspection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Payload could not be encoded.
    #[error("payload encoding failed: {0}")]
    Encode(String),

    /// Inbound bytes did not decode to a known payload.
    #[error("payload decoding failed: {0}")]
    Decode(String),
}

/// Transport-level message body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WirePayload {
    /// Forward instruction addressed to a destination gateway.
    Request {
        /// Application-level originator (the dispatching ledger's identity),
        /// checked against the gateway's source-distributor registry.
        origin: Address,
        /// The batched vault instruction.
        instruction: Instruction,
    },
    /// Return acknowledgement addressed to the source ledger.
    Acknowledgement {
        /// Execution report for a previously forwarded instruction.
        outcome: ExecutionOutcome,
    },
}

impl WirePayload {
    /// Encode for the transport.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode transport bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// SHA-256 hash of an encoded payload.
pub fn payload_hash(bytes: &[u8]) -> PayloadHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Short hex prefix of a payload hash for log lines.
pub fn short_hash(hash: &PayloadHash) -> String {
    hex::encode(&hash[..4])
}
