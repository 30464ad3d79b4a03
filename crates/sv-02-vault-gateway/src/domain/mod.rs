//! # Domain Layer
//!
//! Batch entries and errors for the gateway.

pub mod entities;
pub mod errors;

pub use entities::{batch_entries, BatchEntry};
pub use errors::GatewayError;
