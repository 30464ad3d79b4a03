//! # Trust Registry
//!
//! The authorized-peer table: one expected sender identity per domain.
//! Inbound messages from an unlisted domain, or from a listed domain with a
//! different identity, never reach the gateway or the ledger.

use shared_types::{Address, DomainId};
use std::collections::HashMap;

/// Domain -> authorized peer identity.
#[derive(Clone, Debug, Default)]
pub struct TrustRegistry {
    peers: HashMap<DomainId, Address>,
}

impl TrustRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the trusted peer for a domain.
    pub fn set_peer(&mut self, domain: DomainId, identity: Address) {
        self.peers.insert(domain, identity);
    }

    /// The trusted peer for a domain, if any.
    pub fn peer(&self, domain: DomainId) -> Option<&Address> {
        self.peers.get(&domain)
    }

    /// Whether `sender` is the trusted peer for `domain`.
    pub fn is_trusted(&self, domain: DomainId, sender: &Address) -> bool {
        self.peers.get(&domain) == Some(sender)
    }

    /// Number of configured peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether no peers are configured.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
