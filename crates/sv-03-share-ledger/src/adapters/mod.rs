//! # Adapters Layer
//!
//! In-memory bridge implementation for tests and local wiring.

pub mod mock_bridge;

pub use mock_bridge::MockBridge;
