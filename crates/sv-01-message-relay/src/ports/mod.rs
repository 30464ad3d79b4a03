//! # Ports Layer
//!
//! Inbound: the transport-invoked message endpoint.
//! Outbound: the transport send capability and the execution sinks.

pub mod inbound;
pub mod outbound;

pub use inbound::{MessageEndpoint, ReceiveStatus};
pub use outbound::{
    HandlerError, InstructionExecutor, MessageTransport, OutcomeHandler, TransportEnvelope,
    TransportError,
};
