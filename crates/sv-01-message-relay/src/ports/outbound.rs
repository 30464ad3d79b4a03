//! # Outbound Ports
//!
//! Traits for the external transport and for the subsystems the relay routes
//! into (gateway on the forward leg, ledger on the return leg).

use async_trait::async_trait;
use shared_types::{Address, DomainId, ExecutionOutcome, Instruction, Nonce, VaultId};
use thiserror::Error;

/// Transport metadata travelling with every message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportEnvelope {
    /// Domain the message originates from.
    pub src_domain: DomainId,
    /// Identity the relay presents as sender.
    pub sender: Address,
    /// Per-destination sequence number.
    pub nonce: Nonce,
    /// Encoded wire payload.
    pub payload: Vec<u8>,
}

/// Transport send failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No endpoint reachable for the destination.
    #[error("endpoint unavailable: {0}")]
    Unavailable(String),

    /// The endpoint refused the message.
    #[error("send rejected: {0}")]
    Rejected(String),
}

/// External send capability - outbound port.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Hand a serialized message to the external transport.
    async fn send(&self, dest: DomainId, envelope: TransportEnvelope)
        -> Result<(), TransportError>;
}

/// Failures raised by the execution sinks. Captured by the relay as failed
/// messages; never propagated to the transport.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// Referenced vault was never registered.
    #[error("unknown vault {0}")]
    UnknownVault(VaultId),

    /// Vault-side deposit/withdraw rejected (slippage, liquidity).
    #[error("execution failed: {0}")]
    Execution(String),

    /// Payload failed application-level checks.
    #[error("payload rejected: {0}")]
    Rejected(String),

    /// No sink is wired for this payload kind yet.
    #[error("handler not wired")]
    Unavailable,
}

/// Forward-leg sink: executes instructions against local vaults.
#[async_trait]
pub trait InstructionExecutor: Send + Sync {
    /// Execute a verified forward instruction.
    ///
    /// `src_domain` is the transport-verified origin; `origin` is the
    /// application-level originator from the payload.
    async fn execute(
        &self,
        src_domain: DomainId,
        origin: Address,
        instruction: Instruction,
    ) -> Result<ExecutionOutcome, HandlerError>;
}

/// Return-leg sink: applies outcomes to the local ledger.
#[async_trait]
pub trait OutcomeHandler: Send + Sync {
    /// Apply a verified acknowledgement.
    async fn confirm(&self, outcome: ExecutionOutcome) -> Result<(), HandlerError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Recording executor for relay unit tests.
#[derive(Default)]
pub struct MockExecutor {
    /// Instructions received, in order.
    pub executed: parking_lot::Mutex<Vec<Instruction>>,
    /// Fail every call?
    pub should_fail: bool,
}

#[async_trait]
impl InstructionExecutor for MockExecutor {
    async fn execute(
        &self,
        _src_domain: DomainId,
        _origin: Address,
        instruction: Instruction,
    ) -> Result<ExecutionOutcome, HandlerError> {
        if self.should_fail {
            return Err(HandlerError::Execution("mock failure".to_string()));
        }

        let outcome = ExecutionOutcome {
            instruction_id: instruction.id,
            kind: instruction.kind,
            source_domain: instruction.source_domain,
            entries: instruction
                .vault_ids
                .iter()
                .zip(instruction.amounts.iter())
                .map(|(vault_id, amount)| shared_types::EntryOutcome {
                    vault_id: *vault_id,
                    amount_in: *amount,
                    units_out: *amount,
                })
                .collect(),
            status: shared_types::OutcomeStatus::Executed,
        };
        self.executed.lock().push(instruction);
        Ok(outcome)
    }
}

/// Recording outcome handler for relay unit tests.
#[derive(Default)]
pub struct MockOutcomeHandler {
    /// Outcomes received, in order.
    pub confirmed: parking_lot::Mutex<Vec<ExecutionOutcome>>,
    /// Fail every call?
    pub should_fail: bool,
}

#[async_trait]
impl OutcomeHandler for MockOutcomeHandler {
    async fn confirm(&self, outcome: ExecutionOutcome) -> Result<(), HandlerError> {
        if self.should_fail {
            return Err(HandlerError::Rejected("mock failure".to_string()));
        }
        self.confirmed.lock().push(outcome);
        Ok(())
    }
}
