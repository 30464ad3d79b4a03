//! # SpanVault Test Suite
//!
//! Unified test crate wiring all three subsystems into multi-domain
//! networks over the in-memory transport.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # TestNet: relays, gateways, ledgers per domain
//! └── integration/      # Cross-subsystem flows
//!     ├── deposit_flow.rs
//!     ├── withdraw_flow.rs
//!     ├── replay.rs
//!     └── samechain.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sv-tests
//! cargo test -p sv-tests integration::
//! ```

#![allow(dead_code)]

pub mod harness;
pub mod integration;
