//! # Ledger Errors

use super::balances::BalanceError;
use shared_types::{Action, Address, DomainId, InstructionError, InstructionId, TxKind, VaultId};
use thiserror::Error;

/// Ledger error types.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller lacks the capability for an administrative action.
    #[error("caller {} lacks capability for {action:?}", hex::encode(.caller))]
    Unauthorized {
        /// Rejected caller.
        caller: Address,
        /// Action that was attempted.
        action: Action,
    },

    /// Request shape violation (empty batch, zero amount, uneven entries).
    #[error(transparent)]
    Malformed(#[from] InstructionError),

    /// A withdraw referenced a vault with no registered home domain.
    #[error("no home domain registered for vault {0}")]
    UnknownVaultDomain(VaultId),

    /// A deposit targeted a domain that contradicts the vault's registered
    /// home domain.
    #[error("vault {vault_id} lives on domain {registered}, request targeted {requested}")]
    VaultDomainMismatch {
        /// Vault in question.
        vault_id: VaultId,
        /// Domain in the vault-domain map.
        registered: DomainId,
        /// Domain the request named.
        requested: DomainId,
    },

    /// A withdraw batched vaults living on different domains.
    #[error("withdraw entries span domains {first} and {second}")]
    MixedDomains {
        /// Domain of the first entry.
        first: DomainId,
        /// Conflicting domain.
        second: DomainId,
    },

    /// Share balance mutation failed.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Confirmation referenced an instruction this ledger never dispatched.
    #[error("unknown instruction {0}")]
    UnknownInstruction(InstructionId),

    /// Confirmation kind contradicts the dispatched instruction.
    #[error("outcome for instruction {instruction_id} reports {got:?}, expected {expected:?}")]
    OutcomeMismatch {
        /// Instruction in question.
        instruction_id: InstructionId,
        /// Kind this ledger dispatched.
        expected: TxKind,
        /// Kind the outcome reported.
        got: TxKind,
    },

    /// Rollback requested for a request that is not a confirmed-failed,
    /// un-rolled-back withdraw.
    #[error("instruction {0} is not eligible for withdraw rollback")]
    NotRollbackable(InstructionId),

    /// The bridge adapter refused to take custody.
    #[error("bridge error: {0}")]
    Bridge(String),

    /// The relay refused the dispatch.
    #[error("dispatch error: {0}")]
    Dispatch(String),
}
