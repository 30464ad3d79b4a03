//! # Request Book
//!
//! Source-side bookkeeping for in-flight instructions: what was dispatched,
//! what a withdraw burned (for exact rollback), and the idempotence state
//! consulted by `confirm`.

use shared_types::{Amount, Instruction, InstructionId, InstructionStatus, VaultId};
use std::collections::HashMap;

/// One dispatched instruction awaiting (or past) confirmation.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    /// The dispatched instruction; its status is the source-side lifecycle.
    pub instruction: Instruction,
    /// Shares burned at request acceptance (withdraws only).
    pub burned: Vec<(VaultId, Amount)>,
    /// Whether a confirmed failure has already re-minted the burn.
    pub rolled_back: bool,
}

impl PendingRequest {
    /// Whether confirmation has already finalized this request.
    pub fn is_finalized(&self) -> bool {
        self.instruction.status.is_terminal()
    }
}

/// Instruction id allocator plus the in-flight request table.
#[derive(Clone, Debug, Default)]
pub struct RequestBook {
    requests: HashMap<InstructionId, PendingRequest>,
    last_id: InstructionId,
}

impl RequestBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next instruction id. Monotonic, never reused, even for
    /// requests that later fail to dispatch.
    pub fn allocate_id(&mut self) -> InstructionId {
        self.last_id += 1;
        self.last_id
    }

    /// Record a dispatched request.
    pub fn insert(&mut self, request: PendingRequest) {
        self.requests.insert(request.instruction.id, request);
    }

    /// Remove a request (dispatch failure compensation).
    pub fn remove(&mut self, id: InstructionId) -> Option<PendingRequest> {
        self.requests.remove(&id)
    }

    /// Request by id.
    pub fn get(&self, id: InstructionId) -> Option<&PendingRequest> {
        self.requests.get(&id)
    }

    /// Mutable request by id.
    pub fn get_mut(&mut self, id: InstructionId) -> Option<&mut PendingRequest> {
        self.requests.get_mut(&id)
    }

    /// Lifecycle status for an instruction, if known.
    pub fn status(&self, id: InstructionId) -> Option<InstructionStatus> {
        self.requests.get(&id).map(|r| r.instruction.status)
    }

    /// Number of recorded requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no requests are recorded.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
