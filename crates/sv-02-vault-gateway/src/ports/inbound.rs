//! # Inbound Port
//!
//! API trait defining what the gateway subsystem can do.

use crate::domain::GatewayError;
use crate::ports::outbound::VaultHandle;
use async_trait::async_trait;
use shared_types::{
    Address, DomainId, ExecutionOutcome, Instruction, InstructionId, VaultId,
};
use std::sync::Arc;

/// Vault gateway API - inbound port.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Idempotent vault registration (upsert).
    fn register_vault(
        &self,
        caller: &Address,
        vault_id: VaultId,
        handle: Arc<dyn VaultHandle>,
    ) -> Result<(), GatewayError>;

    /// Restrict which originator on a source domain may address this gateway.
    fn set_source_distributor(
        &self,
        caller: &Address,
        domain: DomainId,
        identity: Address,
    ) -> Result<(), GatewayError>;

    /// Execute a verified forward instruction, all entries or none.
    async fn execute(
        &self,
        src_domain: DomainId,
        origin: Address,
        instruction: Instruction,
    ) -> Result<ExecutionOutcome, GatewayError>;

    /// Recorded outcome for an instruction, if it executed here.
    fn outcome_of(
        &self,
        source_domain: DomainId,
        instruction_id: InstructionId,
    ) -> Option<ExecutionOutcome>;

    /// Whether an instruction has executed here.
    fn is_executed(&self, source_domain: DomainId, instruction_id: InstructionId) -> bool;

    /// Whether a vault is registered.
    fn has_vault(&self, vault_id: VaultId) -> bool;
}
