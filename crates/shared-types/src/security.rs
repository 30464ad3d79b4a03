//! # Capability Guard
//!
//! Centralized authorization for administrative mutations. Every privileged
//! operation (vault registration, trusted-peer updates, retry/force-resume)
//! asks the guard `has_capability(caller, action)` before touching state.
//!
//! The concrete `RoleTable` maps named roles to action sets, so authorization
//! policy lives in one place instead of being re-implemented per subsystem.

use crate::entities::Address;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Administrative actions gated by the guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Register or replace a vault handle on a gateway.
    RegisterVault,
    /// Set the authorized peer identity for a domain.
    SetTrustedPeer,
    /// Set the authorized instruction originator for a source domain.
    SetSourceDistributor,
    /// Map a vault id to its home domain on the ledger.
    SetVaultDomain,
    /// Dispatch an instruction through the relay.
    DispatchInstruction,
    /// Re-run a stored failed message.
    RetryMessage,
    /// Resolve failed messages without executing them.
    ForceResume,
}

/// Named roles, each granting a fixed action set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full administrative control, including role grants.
    Admin,
    /// Protocol contracts allowed to dispatch instructions.
    CoreContracts,
    /// Operators allowed to retry and force-resume deliveries.
    Processor,
    /// Automated operators allowed to retry deliveries.
    Keeper,
}

impl Role {
    /// Whether this role grants the given action.
    pub fn grants(&self, action: Action) -> bool {
        match self {
            Role::Admin => true,
            Role::CoreContracts => matches!(action, Action::DispatchInstruction),
            Role::Processor => matches!(action, Action::RetryMessage | Action::ForceResume),
            Role::Keeper => matches!(action, Action::RetryMessage),
        }
    }
}

/// Authorization predicate injected into every administrative operation.
pub trait CapabilityGuard: Send + Sync {
    /// Check whether `caller` may perform `action`.
    fn has_capability(&self, caller: &Address, action: Action) -> bool;
}

/// Role-based guard: account -> set of roles.
pub struct RoleTable {
    grants: RwLock<HashMap<Address, HashSet<Role>>>,
}

/// Role administration failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    /// Caller lacks the admin role.
    #[error("caller {} is not an admin", hex::encode(.0))]
    NotAdmin(Address),
}

impl RoleTable {
    /// Create a table with a single admin account.
    pub fn new(admin: Address) -> Self {
        let mut grants = HashMap::new();
        grants.insert(admin, HashSet::from([Role::Admin]));
        Self {
            grants: RwLock::new(grants),
        }
    }

    /// Grant `role` to `account`. Admin-gated, idempotent.
    pub fn grant_role(&self, caller: &Address, account: Address, role: Role) -> Result<(), RoleError> {
        if !self.has_role(caller, Role::Admin) {
            return Err(RoleError::NotAdmin(*caller));
        }
        self.grants.write().entry(account).or_default().insert(role);
        info!(
            "[shared] role {:?} granted to {}",
            role,
            hex::encode(account)
        );
        Ok(())
    }

    /// Revoke `role` from `account`. Admin-gated; revoking an absent role is
    /// a no-op.
    pub fn revoke_role(
        &self,
        caller: &Address,
        account: Address,
        role: Role,
    ) -> Result<(), RoleError> {
        if !self.has_role(caller, Role::Admin) {
            return Err(RoleError::NotAdmin(*caller));
        }
        if let Some(roles) = self.grants.write().get_mut(&account) {
            roles.remove(&role);
        }
        Ok(())
    }

    /// Whether `account` holds `role`.
    pub fn has_role(&self, account: &Address, role: Role) -> bool {
        self.grants
            .read()
            .get(account)
            .is_some_and(|roles| roles.contains(&role))
    }
}

impl CapabilityGuard for RoleTable {
    fn has_capability(&self, caller: &Address, action: Action) -> bool {
        self.grants
            .read()
            .get(caller)
            .is_some_and(|roles| roles.iter().any(|role| role.grants(action)))
    }
}

/// Guard that allows everything. For unit tests and single-operator wiring.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenGuard;

impl CapabilityGuard for OpenGuard {
    fn has_capability(&self, _caller: &Address, _action: Action) -> bool {
        true
    }
}
