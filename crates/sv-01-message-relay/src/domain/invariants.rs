//! # Domain Invariants
//!
//! Ordering and authentication rules enforced before any side effect.

use super::trust::TrustRegistry;
use shared_types::{Address, DomainId, Nonce};

/// Next acceptable inbound nonce for a sender. Nonces start at 1.
pub fn next_expected(last_seen: Option<Nonce>) -> Nonce {
    last_seen.map_or(1, |n| n.saturating_add(1))
}

/// Invariant: nonces from one sender are processed without gaps.
///
/// A record for nonce N must exist before N+1 produces side effects, so an
/// incoming nonce is acceptable only if it is exactly the next expected one.
pub fn invariant_nonce_contiguous(expected: Nonce, incoming: Nonce) -> bool {
    incoming == expected
}

/// Invariant: inbound messages are accepted only from the registered peer.
pub fn invariant_sender_trusted(
    trust: &TrustRegistry,
    domain: DomainId,
    sender: &Address,
) -> bool {
    trust.is_trusted(domain, sender)
}
