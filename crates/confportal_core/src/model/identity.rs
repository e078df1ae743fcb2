//! Viewer identity and privilege state.
//!
//! # Responsibility
//! - Define the resolved identity of the current viewer.
//! - Define the privilege triple every gated view reads.
//!
//! # Invariants
//! - A state with no principal is never privileged and never resolving a
//!   role lookup.
//! - A state that is still resolving is never privileged.
//!
//! Both invariants are enforced by construction: the fields are private and
//! only the four constructors below produce values.

use serde::{Deserialize, Serialize};

/// Resolved identity of the current viewer.
///
/// Exists only while signed in; owned by the privilege context and dropped
/// on sign-out or session expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: String,
    label: String,
}

impl Principal {
    /// Creates a principal from the external provider's id and display label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Opaque provider-assigned id, the key for role lookups.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label, typically an email address.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Current viewer privilege snapshot.
///
/// Transitions only through the privilege context; every other component is
/// a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeState {
    principal: Option<Principal>,
    privileged: bool,
    resolving: bool,
}

impl PrivilegeState {
    /// Process-startup state: nobody known yet, first identity callback
    /// still outstanding.
    pub fn startup() -> Self {
        Self {
            principal: None,
            privileged: false,
            resolving: true,
        }
    }

    /// Signed-out state.
    pub fn signed_out() -> Self {
        Self {
            principal: None,
            privileged: false,
            resolving: false,
        }
    }

    /// Signed in, role lookup outstanding. Unprivileged until resolved.
    pub fn resolving(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            privileged: false,
            resolving: true,
        }
    }

    /// Signed in with a settled role lookup.
    pub fn resolved(principal: Principal, privileged: bool) -> Self {
        Self {
            principal: Some(principal),
            privileged,
            resolving: false,
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Whether the current viewer may edit portal content.
    ///
    /// `false` while a role lookup is outstanding.
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Whether a role lookup for the current principal is outstanding.
    pub fn is_resolving(&self) -> bool {
        self.resolving
    }
}
