//! Privilege context: the single writer of privilege state.
//!
//! # Responsibility
//! - Own and mutate the process-wide `PrivilegeState`.
//! - Apply identity-change events in delivery order and guard against stale
//!   role resolutions.
//! - Delegate sign-in/sign-out to the identity collaborator without touching
//!   state (state only changes through delivered events).
//!
//! # Invariants
//! - `is_privileged()` can only become `true` through a resolution whose
//!   principal id matches the current principal.
//! - Sign-in/sign-out failures leave the state exactly as it was.

use crate::identity::provider::{IdentityError, IdentityEvent, IdentityProvider};
use crate::identity::resolver::{RoleProbe, RoleResolution};
use crate::model::identity::{Principal, PrivilegeState};
use log::{debug, info};
use std::rc::Rc;

/// Per-call capability check for gated mutations.
///
/// Gated components take `&dyn EditAuthority` on every mutating call instead
/// of caching the flag; privilege can change between calls.
pub trait EditAuthority {
    fn edit_allowed(&self) -> bool;
}

/// Explicit holder of the current viewer's privilege.
///
/// Constructed once at startup and passed by reference to every component
/// that gates on it. The identity-subscription handler is the only caller of
/// the two mutating methods.
pub struct PrivilegeContext {
    provider: Rc<dyn IdentityProvider>,
    state: PrivilegeState,
}

impl PrivilegeContext {
    /// Creates the context in its startup state (nobody known, first
    /// identity callback outstanding).
    pub fn new(provider: Rc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            state: PrivilegeState::startup(),
        }
    }

    pub fn state(&self) -> &PrivilegeState {
        &self.state
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.state.principal()
    }

    pub fn is_privileged(&self) -> bool {
        self.state.is_privileged()
    }

    pub fn is_resolving(&self) -> bool {
        self.state.is_resolving()
    }

    /// Delegates to the identity collaborator; the state changes only when
    /// the resulting event is delivered.
    pub fn sign_in(&self) -> Result<(), IdentityError> {
        self.provider.sign_in()
    }

    /// Delegates to the identity collaborator; the state changes only when
    /// the resulting event is delivered.
    pub fn sign_out(&self) -> Result<(), IdentityError> {
        self.provider.sign_out()
    }

    /// Applies one identity-change event.
    ///
    /// # Contract
    /// - Sign-out resets to the signed-out state and returns `None`.
    /// - Sign-in installs the principal unprivileged with a lookup
    ///   outstanding and returns the probe the resolver must answer.
    pub fn handle_identity_change(&mut self, event: IdentityEvent) -> Option<RoleProbe> {
        match event {
            IdentityEvent::SignedOut => {
                info!("event=identity_change module=identity status=signed_out");
                self.state = PrivilegeState::signed_out();
                None
            }
            IdentityEvent::SignedIn(principal) => {
                info!(
                    "event=identity_change module=identity status=signed_in principal={}",
                    principal.id()
                );
                let probe = RoleProbe {
                    principal_id: principal.id().to_string(),
                };
                self.state = PrivilegeState::resolving(principal);
                Some(probe)
            }
        }
    }

    /// Applies a settled role resolution.
    ///
    /// Only a resolution naming the current principal is applied; anything
    /// else is a stale answer for a superseded session and is dropped.
    pub fn apply_role_resolution(&mut self, resolution: RoleResolution) {
        let current = match self.state.principal() {
            Some(principal) if principal.id() == resolution.principal_id => principal.clone(),
            _ => {
                debug!(
                    "event=role_resolution module=identity status=stale_dropped principal={}",
                    resolution.principal_id
                );
                return;
            }
        };
        info!(
            "event=role_resolution module=identity status=applied principal={} privileged={}",
            resolution.principal_id, resolution.is_privileged
        );
        self.state = PrivilegeState::resolved(current, resolution.is_privileged);
    }
}

impl EditAuthority for PrivilegeContext {
    fn edit_allowed(&self) -> bool {
        self.state.is_privileged()
    }
}
