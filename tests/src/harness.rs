//! # Multi-Domain Test Harness
//!
//! Wires a relay, gateway, and ledger per domain over one in-memory
//! transport, with the glue adapters a deployment would provide: the relay's
//! execution sinks delegate into the local gateway and ledger, and the
//! ledger's dispatcher delegates into the local relay.
//!
//! Messages sit in the transport outbox until `pump` drains it, so tests
//! control exactly when each cross-domain leg lands.

use async_trait::async_trait;
use shared_types::{
    Address, CapabilityGuard, DomainId, ExecutionOutcome, Instruction, Nonce, Role, RoleTable,
    VaultId, WirePayload,
};
use std::collections::HashMap;
use std::sync::Arc;
use sv_01_message_relay::{
    HandlerError, InMemoryTransport, InstructionExecutor, MessageRelay, OutcomeHandler,
    RelayConfig, RelayError,
};
use sv_02_vault_gateway::{GatewayApi, GatewayConfig, GatewayError, MockVault, VaultGateway};
use sv_03_share_ledger::{
    DispatchError, InstructionDispatcher, LedgerConfig, MockBridge, ShareLedger,
};

/// Administrative account holding the admin role on every domain.
pub const ADMIN: Address = [0x01; 20];

/// Operator granted the processor role (retry / force-resume).
pub const OPERATOR: Address = [0x02; 20];

/// A test user.
pub const ALICE: Address = [0xA1; 20];

/// Another test user.
pub const BOB: Address = [0xB2; 20];

/// A test asset.
pub const USDC: Address = [0xC0; 20];

/// Relay identity for a domain (the transport-level trusted peer).
pub fn relay_identity(domain: DomainId) -> Address {
    let mut id = [0x10; 20];
    id[19] = domain as u8;
    id
}

/// Ledger identity for a domain (the application-level distributor).
pub fn ledger_identity(domain: DomainId) -> Address {
    let mut id = [0x20; 20];
    id[19] = domain as u8;
    id
}

/// Ledger type as wired in the harness.
pub type HarnessLedger = ShareLedger<MockBridge, RelayDispatcher>;

/// Relay -> gateway glue: the forward-leg execution sink.
pub struct GatewayExecutor(pub Arc<VaultGateway>);

#[async_trait]
impl InstructionExecutor for GatewayExecutor {
    async fn execute(
        &self,
        src_domain: DomainId,
        origin: Address,
        instruction: Instruction,
    ) -> Result<ExecutionOutcome, HandlerError> {
        self.0
            .execute(src_domain, origin, instruction)
            .await
            .map_err(|e| match e {
                GatewayError::UnknownVault(vault_id) => HandlerError::UnknownVault(vault_id),
                GatewayError::ExecutionFailed { .. } | GatewayError::SlippageExceeded { .. } => {
                    HandlerError::Execution(e.to_string())
                }
                other => HandlerError::Rejected(other.to_string()),
            })
    }
}

/// Relay -> ledger glue: the return-leg confirmation sink.
pub struct LedgerConfirmer(pub Arc<HarnessLedger>);

#[async_trait]
impl OutcomeHandler for LedgerConfirmer {
    async fn confirm(&self, outcome: ExecutionOutcome) -> Result<(), HandlerError> {
        use sv_03_share_ledger::LedgerApi;
        self.0
            .confirm(outcome)
            .await
            .map_err(|e| HandlerError::Rejected(e.to_string()))
    }
}

/// Ledger -> relay glue: the dispatch capability.
pub struct RelayDispatcher(pub Arc<MessageRelay>);

#[async_trait]
impl InstructionDispatcher for RelayDispatcher {
    async fn dispatch(
        &self,
        caller: Address,
        dest: DomainId,
        payload: WirePayload,
    ) -> Result<Nonce, DispatchError> {
        self.0
            .dispatch(&caller, dest, &payload)
            .await
            .map_err(|e| match e {
                RelayError::UntrustedDestination(domain) => {
                    DispatchError::UntrustedDestination(domain)
                }
                RelayError::Unauthorized { .. } => DispatchError::Unauthorized,
                other => DispatchError::Transport(other.to_string()),
            })
    }
}

/// One fully wired domain.
pub struct DomainNode {
    /// Domain id.
    pub domain: DomainId,
    /// The domain's relay.
    pub relay: Arc<MessageRelay>,
    /// The domain's gateway.
    pub gateway: Arc<VaultGateway>,
    /// The domain's ledger.
    pub ledger: Arc<HarnessLedger>,
    /// The domain's bridge adapter.
    pub bridge: Arc<MockBridge>,
    /// The domain's role table.
    pub roles: Arc<RoleTable>,
}

/// A set of domains sharing one in-memory transport.
pub struct TestNet {
    /// The shared transport.
    pub transport: Arc<InMemoryTransport>,
    nodes: HashMap<DomainId, DomainNode>,
}

impl TestNet {
    /// Build a network of fully cross-trusted domains.
    pub fn new(domains: &[DomainId]) -> Self {
        let transport = Arc::new(InMemoryTransport::new());
        let mut nodes = HashMap::new();

        for &domain in domains {
            let roles = Arc::new(RoleTable::new(ADMIN));
            roles
                .grant_role(&ADMIN, ledger_identity(domain), Role::CoreContracts)
                .unwrap();
            roles
                .grant_role(&ADMIN, OPERATOR, Role::Processor)
                .unwrap();

            let relay = Arc::new(MessageRelay::new(
                RelayConfig {
                    domain,
                    identity: relay_identity(domain),
                },
                transport.clone(),
                roles.clone() as Arc<dyn CapabilityGuard>,
            ));
            let gateway = Arc::new(VaultGateway::new(
                GatewayConfig { domain },
                roles.clone() as Arc<dyn CapabilityGuard>,
            ));
            let bridge = Arc::new(MockBridge::new());
            let ledger = Arc::new(ShareLedger::new(
                LedgerConfig {
                    domain,
                    identity: ledger_identity(domain),
                    default_fee_budget: 500,
                },
                bridge.clone(),
                Arc::new(RelayDispatcher(relay.clone())),
                roles.clone() as Arc<dyn CapabilityGuard>,
            ));

            relay.bind_executor(Arc::new(GatewayExecutor(gateway.clone())));
            relay.bind_outcome_handler(Arc::new(LedgerConfirmer(ledger.clone())));
            transport.register_endpoint(domain, relay.clone());

            nodes.insert(
                domain,
                DomainNode {
                    domain,
                    relay,
                    gateway,
                    ledger,
                    bridge,
                    roles,
                },
            );
        }

        // Full cross-trust, including each domain trusting itself for the
        // same-domain short circuit.
        for &a in domains {
            for &b in domains {
                nodes[&a]
                    .relay
                    .set_trusted_peer(&ADMIN, b, relay_identity(b))
                    .unwrap();
                nodes[&a]
                    .gateway
                    .set_source_distributor(&ADMIN, b, ledger_identity(b))
                    .unwrap();
            }
        }

        Self { transport, nodes }
    }

    /// Node for a domain.
    pub fn node(&self, domain: DomainId) -> &DomainNode {
        &self.nodes[&domain]
    }

    /// Deliver queued messages until the network is quiescent. Returns the
    /// number of messages delivered.
    pub async fn pump(&self) -> usize {
        self.transport.deliver_all().await
    }

    /// Register a fresh mock vault on `domain` and map it there on every
    /// ledger. Returns the vault handle for state assertions.
    pub fn install_vault(&self, domain: DomainId, vault_id: VaultId) -> Arc<MockVault> {
        let vault = Arc::new(MockVault::new());
        self.nodes[&domain]
            .gateway
            .register_vault(&ADMIN, vault_id, vault.clone())
            .unwrap();
        for node in self.nodes.values() {
            node.ledger
                .set_vault_domain(&ADMIN, vault_id, domain)
                .unwrap();
        }
        vault
    }
}
