//! # Message Relay Service
//!
//! Core dispatch/receive/retry logic. One relay instance per domain; the
//! relay owns the trusted-peer table, the per-destination sequence counters,
//! and the delivery/failed-message tables, and is their only writer.

use crate::domain::{
    invariant_nonce_contiguous, invariant_sender_trusted, next_expected, DeliveryKey,
    DeliveryRecord, DeliveryStatus, FailedMessage, RelayError, TrustRegistry,
};
use crate::ports::inbound::{MessageEndpoint, ReceiveStatus};
use crate::ports::outbound::{
    HandlerError, InstructionExecutor, MessageTransport, OutcomeHandler, TransportEnvelope,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::payload::{payload_hash, short_hash};
use shared_types::{
    Action, Address, CapabilityGuard, DomainId, ExecutionOutcome, Nonce, WirePayload,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Per-domain relay configuration.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Domain this relay executes in.
    pub domain: DomainId,
    /// Identity this relay presents as sender.
    pub identity: Address,
}

/// Tables owned by the relay. Single writer: this relay.
struct RelayState {
    trust: TrustRegistry,
    /// Last outbound nonce per destination; consumed even when a send fails.
    outbound: HashMap<DomainId, Nonce>,
    /// Highest recorded inbound nonce per (domain, sender).
    last_seen: HashMap<(DomainId, Address), Nonce>,
    records: HashMap<DeliveryKey, DeliveryRecord>,
    failed: HashMap<DeliveryKey, FailedMessage>,
}

/// Execution sinks, bound after construction so a domain can host the
/// gateway role, the ledger role, or both.
#[derive(Default)]
struct Routes {
    executor: Option<Arc<dyn InstructionExecutor>>,
    outcomes: Option<Arc<dyn OutcomeHandler>>,
}

/// Message relay for one domain.
pub struct MessageRelay {
    config: RelayConfig,
    state: RwLock<RelayState>,
    routes: RwLock<Routes>,
    transport: Arc<dyn MessageTransport>,
    guard: Arc<dyn CapabilityGuard>,
}

impl MessageRelay {
    /// Create a relay with no trusted peers and no bound sinks.
    pub fn new(
        config: RelayConfig,
        transport: Arc<dyn MessageTransport>,
        guard: Arc<dyn CapabilityGuard>,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(RelayState {
                trust: TrustRegistry::new(),
                outbound: HashMap::new(),
                last_seen: HashMap::new(),
                records: HashMap::new(),
                failed: HashMap::new(),
            }),
            routes: RwLock::new(Routes::default()),
            transport,
            guard,
        }
    }

    /// Domain this relay serves.
    pub fn domain(&self) -> DomainId {
        self.config.domain
    }

    /// Bind the forward-leg sink (the local gateway).
    pub fn bind_executor(&self, executor: Arc<dyn InstructionExecutor>) {
        self.routes.write().executor = Some(executor);
    }

    /// Bind the return-leg sink (the local ledger).
    pub fn bind_outcome_handler(&self, outcomes: Arc<dyn OutcomeHandler>) {
        self.routes.write().outcomes = Some(outcomes);
    }

    // -------------------------------------------------------------------------
    // Administration
    // -------------------------------------------------------------------------

    /// Set the trusted peer identity for a domain.
    pub fn set_trusted_peer(
        &self,
        caller: &Address,
        domain: DomainId,
        identity: Address,
    ) -> Result<(), RelayError> {
        self.check_capability(caller, Action::SetTrustedPeer)?;
        self.state.write().trust.set_peer(domain, identity);
        info!(
            "[sv-01] trusted peer for domain {} set to {}",
            domain,
            hex::encode(identity)
        );
        Ok(())
    }

    /// The trusted peer for a domain, if configured.
    pub fn trusted_peer(&self, domain: DomainId) -> Option<Address> {
        self.state.read().trust.peer(domain).copied()
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Serialize a payload, allocate the next per-destination nonce, and hand
    /// it to the transport. Capability-gated surface for the ledger.
    pub async fn dispatch(
        &self,
        caller: &Address,
        dest: DomainId,
        payload: &WirePayload,
    ) -> Result<Nonce, RelayError> {
        self.check_capability(caller, Action::DispatchInstruction)?;
        self.dispatch_payload(dest, payload).await
    }

    /// Internal dispatch, also used for the return leg.
    async fn dispatch_payload(
        &self,
        dest: DomainId,
        payload: &WirePayload,
    ) -> Result<Nonce, RelayError> {
        let bytes = payload.encode()?;
        let nonce = {
            let mut state = self.state.write();
            if state.trust.peer(dest).is_none() {
                return Err(RelayError::UntrustedDestination(dest));
            }
            let counter = state.outbound.entry(dest).or_insert(0);
            *counter += 1;
            *counter
        };

        if dest == self.config.domain {
            // Same-domain short circuit: deliver through the normal receive
            // path with our own identity as sender.
            debug!(
                "[sv-01] delivering nonce {} locally on domain {}",
                nonce, dest
            );
            Box::pin(self.on_message(
                self.config.domain,
                self.config.identity,
                nonce,
                bytes,
            ))
            .await?;
        } else {
            self.transport
                .send(
                    dest,
                    TransportEnvelope {
                        src_domain: self.config.domain,
                        sender: self.config.identity,
                        nonce,
                        payload: bytes,
                    },
                )
                .await
                .map_err(|e| RelayError::Transport(e.to_string()))?;
        }

        info!(
            "[sv-01] dispatched nonce {} from domain {} to domain {}",
            nonce, self.config.domain, dest
        );
        Ok(nonce)
    }

    // -------------------------------------------------------------------------
    // Retry / force-resume
    // -------------------------------------------------------------------------

    /// Re-run a stored failed message. Idempotent: repeat failure leaves all
    /// state unchanged and the call may be repeated any number of times.
    pub async fn retry(
        &self,
        caller: &Address,
        src_domain: DomainId,
        sender: Address,
        nonce: Nonce,
    ) -> Result<ReceiveStatus, RelayError> {
        self.check_capability(caller, Action::RetryMessage)?;
        let key = DeliveryKey {
            src_domain,
            sender,
            nonce,
        };
        let stored = {
            let state = self.state.read();
            let record = state
                .records
                .get(&key)
                .ok_or(RelayError::UnknownDelivery {
                    domain: src_domain,
                    nonce,
                })?;
            if record.status != DeliveryStatus::Failed {
                return Err(RelayError::NotFailed {
                    domain: src_domain,
                    nonce,
                    status: record.status,
                });
            }
            state
                .failed
                .get(&key)
                .cloned()
                .ok_or(RelayError::UnknownDelivery {
                    domain: src_domain,
                    nonce,
                })?
        };

        info!(
            "[sv-01] retrying message {} from domain {} nonce {}",
            short_hash(&stored.payload_hash),
            src_domain,
            nonce
        );

        let wire = match WirePayload::decode(&stored.payload) {
            Ok(wire) => wire,
            Err(e) => {
                warn!("[sv-01] retry failed again for nonce {}: {}", nonce, e);
                return Ok(ReceiveStatus::Stored);
            }
        };
        match self.route(src_domain, wire).await {
            Ok(status) => {
                let mut state = self.state.write();
                if let Some(record) = state.records.get_mut(&key) {
                    record.transition_to(DeliveryStatus::Executed)?;
                }
                state.failed.remove(&key);
                info!("[sv-01] retry succeeded for domain {} nonce {}", src_domain, nonce);
                Ok(status)
            }
            Err(e) => {
                warn!("[sv-01] retry failed again for nonce {}: {}", nonce, e);
                Ok(ReceiveStatus::Stored)
            }
        }
    }

    /// Resolve every failed delivery from one sender without executing it,
    /// reporting each abandoned forward instruction back to its source as a
    /// failed outcome. The audited escape hatch for permanently
    /// undeliverable messages. Returns the number of resolved deliveries.
    pub async fn force_resume_receive(
        &self,
        caller: &Address,
        src_domain: DomainId,
        sender: Address,
    ) -> Result<usize, RelayError> {
        self.check_capability(caller, Action::ForceResume)?;

        let (resolved, failure_acks) = {
            let mut state = self.state.write();
            let mut keys: Vec<DeliveryKey> = state
                .records
                .values()
                .filter(|r| {
                    r.key.src_domain == src_domain
                        && r.key.sender == sender
                        && r.status == DeliveryStatus::Failed
                })
                .map(|r| r.key)
                .collect();
            keys.sort_by_key(|k| k.nonce);

            let mut acks = Vec::new();
            for key in &keys {
                if let Some(record) = state.records.get_mut(key) {
                    record.transition_to(DeliveryStatus::Resolved)?;
                }
                if let Some(failed) = state.failed.remove(key) {
                    if let Ok(WirePayload::Request { instruction, .. }) =
                        WirePayload::decode(&failed.payload)
                    {
                        acks.push(ExecutionOutcome::failed(
                            instruction.id,
                            instruction.kind,
                            instruction.source_domain,
                        ));
                    }
                }
            }
            (keys.len(), acks)
        };

        warn!(
            "[sv-01] force-resumed {} deliveries from domain {} sender {}",
            resolved,
            src_domain,
            hex::encode(sender)
        );

        for outcome in failure_acks {
            let ack = WirePayload::Acknowledgement { outcome };
            if let Err(e) = self.dispatch_payload(src_domain, &ack).await {
                error!(
                    "[sv-01] failed to dispatch abandonment ack to domain {}: {}",
                    src_domain, e
                );
            }
        }
        Ok(resolved)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Whether a nonce has been processed (executed or resolved).
    pub fn is_processed(&self, src_domain: DomainId, sender: Address, nonce: Nonce) -> bool {
        self.delivery_status(src_domain, sender, nonce)
            .is_some_and(|status| status.is_terminal())
    }

    /// Delivery state for a nonce, if recorded.
    pub fn delivery_status(
        &self,
        src_domain: DomainId,
        sender: Address,
        nonce: Nonce,
    ) -> Option<DeliveryStatus> {
        let key = DeliveryKey {
            src_domain,
            sender,
            nonce,
        };
        self.state.read().records.get(&key).map(|r| r.status)
    }

    /// The stored failed message for a nonce, if any.
    pub fn failed_message(
        &self,
        src_domain: DomainId,
        sender: Address,
        nonce: Nonce,
    ) -> Option<FailedMessage> {
        let key = DeliveryKey {
            src_domain,
            sender,
            nonce,
        };
        self.state.read().failed.get(&key).cloned()
    }

    /// Next acceptable inbound nonce from a sender.
    pub fn next_inbound_nonce(&self, src_domain: DomainId, sender: Address) -> Nonce {
        next_expected(
            self.state
                .read()
                .last_seen
                .get(&(src_domain, sender))
                .copied(),
        )
    }

    /// Last outbound nonce consumed for a destination (0 if none).
    pub fn outbound_nonce(&self, dest: DomainId) -> Nonce {
        self.state.read().outbound.get(&dest).copied().unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn check_capability(&self, caller: &Address, action: Action) -> Result<(), RelayError> {
        if !self.guard.has_capability(caller, action) {
            return Err(RelayError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Route a decoded payload into the bound sink and, for forward
    /// instructions, dispatch the acknowledgement back to the source.
    async fn route(
        &self,
        src_domain: DomainId,
        wire: WirePayload,
    ) -> Result<ReceiveStatus, HandlerError> {
        match wire {
            WirePayload::Request {
                origin,
                instruction,
            } => {
                let executor = self
                    .routes
                    .read()
                    .executor
                    .clone()
                    .ok_or(HandlerError::Unavailable)?;
                let outcome = executor.execute(src_domain, origin, instruction).await?;
                let ack = WirePayload::Acknowledgement { outcome };
                // The vault side effects are committed; an ack dispatch
                // failure must not push this delivery onto the retry path.
                if let Err(e) = Box::pin(self.dispatch_payload(src_domain, &ack)).await {
                    error!(
                        "[sv-01] failed to dispatch acknowledgement to domain {}: {}",
                        src_domain, e
                    );
                }
                Ok(ReceiveStatus::Executed)
            }
            WirePayload::Acknowledgement { outcome } => {
                let handler = self
                    .routes
                    .read()
                    .outcomes
                    .clone()
                    .ok_or(HandlerError::Unavailable)?;
                handler.confirm(outcome).await?;
                Ok(ReceiveStatus::Confirmed)
            }
        }
    }

    /// Mark a delivery failed and persist its payload for retry. A repeat
    /// failure during retry finds the record already `Failed` and leaves
    /// everything unchanged.
    fn capture_failure(&self, key: DeliveryKey, payload: Vec<u8>, reason: String) {
        let mut guard = self.state.write();
        let state = &mut *guard;
        if let Some(record) = state.records.get_mut(&key) {
            let hash = record.payload_hash;
            if record.mark_failed(reason.clone()).is_ok() {
                state.failed.insert(
                    key,
                    FailedMessage {
                        key,
                        payload,
                        payload_hash: hash,
                        reason: reason.clone(),
                    },
                );
            }
        }
        warn!(
            "[sv-01] message from domain {} nonce {} failed: {}",
            key.src_domain, key.nonce, reason
        );
    }
}

#[async_trait]
impl MessageEndpoint for MessageRelay {
    async fn on_message(
        &self,
        src_domain: DomainId,
        sender: Address,
        nonce: Nonce,
        payload: Vec<u8>,
    ) -> Result<ReceiveStatus, RelayError> {
        // Authentication precedes every other check; rejected senders leave
        // no trace to reprocess.
        {
            let state = self.state.read();
            if !invariant_sender_trusted(&state.trust, src_domain, &sender) {
                warn!(
                    "[sv-01] dropped message from untrusted sender {} on domain {}",
                    hex::encode(sender),
                    src_domain
                );
                return Err(RelayError::UntrustedSender {
                    domain: src_domain,
                    sender,
                });
            }
        }

        let key = DeliveryKey {
            src_domain,
            sender,
            nonce,
        };
        let hash = payload_hash(&payload);
        {
            let mut state = self.state.write();
            if state.records.contains_key(&key) {
                debug!(
                    "[sv-01] duplicate delivery from domain {} nonce {}, ignoring",
                    src_domain, nonce
                );
                return Ok(ReceiveStatus::Duplicate);
            }
            let expected = next_expected(state.last_seen.get(&(src_domain, sender)).copied());
            if !invariant_nonce_contiguous(expected, nonce) {
                return Err(RelayError::NonceGap {
                    domain: src_domain,
                    expected,
                    got: nonce,
                });
            }
            state.records.insert(key, DeliveryRecord::new(key, hash));
            state.last_seen.insert((src_domain, sender), nonce);
        }

        debug!(
            "[sv-01] received message {} from domain {} nonce {}",
            short_hash(&hash),
            src_domain,
            nonce
        );

        let wire = match WirePayload::decode(&payload) {
            Ok(wire) => wire,
            Err(e) => {
                self.capture_failure(key, payload, e.to_string());
                return Ok(ReceiveStatus::Stored);
            }
        };
        match self.route(src_domain, wire).await {
            Ok(status) => {
                let mut state = self.state.write();
                if let Some(record) = state.records.get_mut(&key) {
                    record.transition_to(DeliveryStatus::Executed)?;
                }
                Ok(status)
            }
            Err(e) => {
                self.capture_failure(key, payload, e.to_string());
                Ok(ReceiveStatus::Stored)
            }
        }
    }
}
