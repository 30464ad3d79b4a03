//! # In-Memory Transport
//!
//! Queue-backed transport connecting relays in one process. Messages are not
//! delivered inside `send`; they sit in an outbox until a pump call drains
//! them, so tests control delivery timing, ordering, and duplication
//! explicitly. This models the asynchronous, unordered transport boundary.

use crate::ports::inbound::MessageEndpoint;
use crate::ports::outbound::{MessageTransport, TransportEnvelope, TransportError};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::DomainId;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// In-process transport between registered domain endpoints.
#[derive(Default)]
pub struct InMemoryTransport {
    endpoints: RwLock<HashMap<DomainId, Arc<dyn MessageEndpoint>>>,
    outbox: Mutex<VecDeque<(DomainId, TransportEnvelope)>>,
}

impl InMemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the receiving endpoint for a domain.
    pub fn register_endpoint(&self, domain: DomainId, endpoint: Arc<dyn MessageEndpoint>) {
        self.endpoints.write().insert(domain, endpoint);
    }

    /// Number of queued, undelivered messages.
    pub fn pending(&self) -> usize {
        self.outbox.lock().len()
    }

    /// Deliver the oldest queued message, if any. Rejections (untrusted
    /// sender, nonce gap) are logged and dropped, matching a transport that
    /// discards refused deliveries.
    pub async fn deliver_next(&self) -> bool {
        let next = self.outbox.lock().pop_front();
        let Some((dest, envelope)) = next else {
            return false;
        };
        let endpoint = self.endpoints.read().get(&dest).cloned();
        match endpoint {
            Some(endpoint) => {
                if let Err(e) = endpoint
                    .on_message(
                        envelope.src_domain,
                        envelope.sender,
                        envelope.nonce,
                        envelope.payload,
                    )
                    .await
                {
                    warn!("[sv-01] transport dropped rejected delivery: {}", e);
                }
            }
            None => {
                warn!("[sv-01] no endpoint registered for domain {}", dest);
            }
        }
        true
    }

    /// Deliver queued messages until the outbox is empty, including messages
    /// enqueued by deliveries themselves (acknowledgements). Returns the
    /// number of messages delivered.
    pub async fn deliver_all(&self) -> usize {
        let mut delivered = 0;
        while self.deliver_next().await {
            delivered += 1;
        }
        delivered
    }

    /// Duplicate the oldest queued message. Test hook for replay scenarios.
    pub fn duplicate_front(&self) {
        let mut outbox = self.outbox.lock();
        if let Some(front) = outbox.front().cloned() {
            outbox.push_front(front);
        }
    }
}

#[async_trait]
impl MessageTransport for InMemoryTransport {
    async fn send(
        &self,
        dest: DomainId,
        envelope: TransportEnvelope,
    ) -> Result<(), TransportError> {
        self.outbox.lock().push_back((dest, envelope));
        Ok(())
    }
}
