//! # Gateway Errors
//!
//! Every execution error surfaces to the relay, which captures it for retry;
//! nothing partial is ever reported upstream.

use shared_types::{Action, Address, Amount, DomainId, InstructionError, VaultId};
use thiserror::Error;

/// Gateway error types.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Caller lacks the capability for an administrative action.
    #[error("caller {} lacks capability for {action:?}", hex::encode(.caller))]
    Unauthorized {
        /// Rejected caller.
        caller: Address,
        /// Action that was attempted.
        action: Action,
    },

    /// No source distributor is registered for the instruction's domain.
    #[error("no source distributor registered for domain {0}")]
    UnknownSourceDomain(DomainId),

    /// The payload's originator is not the registered distributor.
    #[error("untrusted originator {} for domain {domain}", hex::encode(.origin))]
    UntrustedOriginator {
        /// Source domain of the instruction.
        domain: DomainId,
        /// Rejected application-level originator.
        origin: Address,
    },

    /// Instruction claims a different source domain than the transport
    /// verified.
    #[error("instruction claims source domain {claimed}, transport verified {verified}")]
    SourceMismatch {
        /// Domain named in the instruction.
        claimed: DomainId,
        /// Domain the relay authenticated.
        verified: DomainId,
    },

    /// Instruction is addressed to a different domain.
    #[error("instruction addressed to domain {addressed}, this gateway serves {local}")]
    WrongDestination {
        /// Destination named in the instruction.
        addressed: DomainId,
        /// Domain this gateway serves.
        local: DomainId,
    },

    /// Instruction shape violation.
    #[error(transparent)]
    Malformed(#[from] InstructionError),

    /// Referenced vault was never registered.
    #[error("unknown vault {0}")]
    UnknownVault(VaultId),

    /// Vault output fell below the entry's slippage floor.
    #[error("vault {vault_id} returned {got} units, below slippage floor {minimum}")]
    SlippageExceeded {
        /// Vault that underdelivered.
        vault_id: VaultId,
        /// Floor implied by the entry's slippage bound.
        minimum: Amount,
        /// Units actually returned.
        got: Amount,
    },

    /// Vault-side deposit/withdraw rejected.
    #[error("vault {vault_id} execution failed: {reason}")]
    ExecutionFailed {
        /// Vault that rejected the operation.
        vault_id: VaultId,
        /// Vault-reported reason.
        reason: String,
    },
}
