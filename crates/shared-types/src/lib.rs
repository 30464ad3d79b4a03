//! # Shared Types Crate
//!
//! Cross-subsystem types for the SpanVault protocol: instruction entities,
//! the wire payload codec, and the capability guard used to gate every
//! administrative mutation.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: types that cross a subsystem boundary are
//!   defined here, never duplicated per crate.
//! - **Single Writer per Domain**: nothing in this crate holds protocol
//!   state; tables live inside the owning subsystem's service.
//! - **Capability-Gated Administration**: every administrative operation
//!   checks the `CapabilityGuard` before mutating anything.

pub mod entities;
pub mod payload;
pub mod security;

pub use entities::*;
pub use payload::{payload_hash, CodecError, WirePayload};
pub use security::{Action, CapabilityGuard, OpenGuard, Role, RoleTable};
