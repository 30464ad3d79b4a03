//! # Ports Layer
//!
//! Inbound: the ledger API and its request entry types.
//! Outbound: the asset bridge and instruction dispatch capabilities.

pub mod inbound;
pub mod outbound;

pub use inbound::{DepositEntry, LedgerApi, WithdrawEntry};
pub use outbound::{
    AssetBridge, BridgeError, BridgeReceipt, DispatchError, InstructionDispatcher,
};
