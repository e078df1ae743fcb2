//! External identity and role-store collaborator contracts.
//!
//! # Responsibility
//! - Define the seam to the sign-in provider (events, sign-in/out actions).
//! - Define the seam to the keyed role store.
//!
//! # Invariants
//! - Events are delivered to a subscription in provider order.
//! - A cancelled subscription receives no further events.

use crate::model::identity::Principal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

/// Externally observed identity change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// A viewer session became active.
    SignedIn(Principal),
    /// The session ended, by explicit sign-out or expiry.
    SignedOut,
}

/// Sign-in/sign-out failures reported by the identity collaborator.
///
/// Surfaced to the initiating UI action; privilege state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    SignInRejected(String),
    SignOutRejected(String),
    /// No identity collaborator is attached (offline portal session).
    ProviderUnattached,
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignInRejected(reason) => write!(f, "sign-in rejected: {reason}"),
            Self::SignOutRejected(reason) => write!(f, "sign-out rejected: {reason}"),
            Self::ProviderUnattached => write!(f, "no identity provider attached"),
        }
    }
}

impl Error for IdentityError {}

/// Contract of the external identity collaborator.
///
/// Implementations deliver identity changes through the subscription channel
/// and perform the actual sign-in/sign-out round trips. The portal core is
/// single-threaded by contract, so handles are shared via `Rc`.
pub trait IdentityProvider {
    /// Registers for identity-change delivery.
    ///
    /// The returned subscription is the only delivery path; it must be
    /// released at teardown via [`IdentitySubscription::cancel`] or drop.
    fn subscribe(&self) -> IdentitySubscription;

    /// Starts an interactive sign-in. The outcome arrives as an event.
    fn sign_in(&self) -> Result<(), IdentityError>;

    /// Ends the current session. The outcome arrives as an event.
    fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Cancellable registration for identity-change delivery.
///
/// Events queue in delivery order until drained; dropping the subscription
/// unregisters it from the provider.
pub struct IdentitySubscription {
    events: Receiver<IdentityEvent>,
    on_cancel: Option<Box<dyn FnOnce()>>,
}

impl IdentitySubscription {
    /// Wraps a delivery channel plus the provider's unregistration hook.
    pub fn new(events: Receiver<IdentityEvent>, on_cancel: impl FnOnce() + 'static) -> Self {
        Self {
            events,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// Takes the next pending event, oldest first.
    ///
    /// Returns `None` when no event is pending or the provider side is gone.
    pub fn try_next(&self) -> Option<IdentityEvent> {
        self.events.try_recv().ok()
    }

    /// Unregisters from the provider. Idempotent; already-queued events stay
    /// drainable.
    pub fn cancel(&mut self) {
        if let Some(release) = self.on_cancel.take() {
            release();
        }
    }
}

impl Drop for IdentitySubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for IdentitySubscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySubscription")
            .field("cancelled", &self.on_cancel.is_none())
            .finish()
    }
}

/// Role document stored per principal id in the external role store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoleRecord {
    pub is_privileged: bool,
}

/// Role-store transport failures.
///
/// Never surfaced as an error to viewers; the resolver maps every variant to
/// unprivileged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleLookupError {
    Unavailable(String),
    MalformedRecord(String),
}

impl Display for RoleLookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "role store unavailable: {reason}"),
            Self::MalformedRecord(details) => write!(f, "malformed role record: {details}"),
        }
    }
}

impl Error for RoleLookupError {}

/// Contract of the external keyed role store.
pub trait RoleLookup {
    /// Fetches the role document for one principal id.
    ///
    /// `Ok(None)` means no role document exists for the principal.
    fn lookup_role(&self, principal_id: &str) -> Result<Option<RoleRecord>, RoleLookupError>;
}
