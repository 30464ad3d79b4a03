//! # Adapters Layer
//!
//! In-memory vault implementation for tests and local wiring.

pub mod mock_vault;

pub use mock_vault::MockVault;
