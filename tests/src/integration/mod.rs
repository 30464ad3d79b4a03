//! # Integration Flows
//!
//! Cross-subsystem tests over multi-domain networks: the full
//! request -> dispatch -> execute -> acknowledge -> confirm choreography.

pub mod deposit_flow;
pub mod replay;
pub mod samechain;
pub mod withdraw_flow;
