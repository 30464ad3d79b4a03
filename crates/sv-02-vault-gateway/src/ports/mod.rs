//! # Ports Layer
//!
//! Inbound: the gateway API.
//! Outbound: the vault handle capability.

pub mod inbound;
pub mod outbound;

pub use inbound::GatewayApi;
pub use outbound::{VaultError, VaultHandle};
