//! In-process identity collaborators for demos and tests.
//!
//! These stand in for the real network-backed identity and role-store
//! collaborators behind the same traits, so the whole portal core can run
//! end-to-end without a backend.

use crate::identity::provider::{
    IdentityError, IdentityEvent, IdentityProvider, IdentitySubscription, RoleLookup,
    RoleLookupError, RoleRecord,
};
use crate::model::identity::Principal;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{channel, Sender};

#[derive(Default)]
struct ProviderInner {
    session: Option<Principal>,
    subscriber: Option<Sender<IdentityEvent>>,
    subscriber_epoch: u64,
    next_sign_in_failure: Option<String>,
    next_sign_out_failure: Option<String>,
}

impl ProviderInner {
    fn emit(&self, event: IdentityEvent) {
        if let Some(subscriber) = &self.subscriber {
            // A dropped receiver behaves like a cancelled subscription.
            let _ = subscriber.send(event);
        }
    }
}

/// Scripted identity collaborator.
///
/// `sign_in` activates the configured account; tests and the CLI probe can
/// also switch accounts, expire the session, and inject failures.
pub struct LocalIdentityProvider {
    account: RefCell<Principal>,
    inner: Rc<RefCell<ProviderInner>>,
}

impl LocalIdentityProvider {
    /// Creates a provider whose interactive sign-in yields `account`.
    pub fn new(account: Principal) -> Self {
        Self {
            account: RefCell::new(account),
            inner: Rc::new(RefCell::new(ProviderInner::default())),
        }
    }

    /// Activates a session for a specific account, as if the provider
    /// switched users, and delivers the sign-in event.
    pub fn sign_in_as(&self, principal: Principal) {
        *self.account.borrow_mut() = principal.clone();
        let mut inner = self.inner.borrow_mut();
        inner.session = Some(principal.clone());
        inner.emit(IdentityEvent::SignedIn(principal));
    }

    /// Ends the session without an explicit sign-out call, as the provider
    /// does when a session token expires.
    pub fn expire_session(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.session.take().is_some() {
            inner.emit(IdentityEvent::SignedOut);
        }
    }

    /// Makes the next `sign_in` call fail with `reason`.
    pub fn fail_next_sign_in(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().next_sign_in_failure = Some(reason.into());
    }

    /// Makes the next `sign_out` call fail with `reason`.
    pub fn fail_next_sign_out(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().next_sign_out_failure = Some(reason.into());
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn subscribe(&self) -> IdentitySubscription {
        let (sender, receiver) = channel();
        let epoch = {
            let mut inner = self.inner.borrow_mut();
            inner.subscriber_epoch += 1;
            inner.subscriber = Some(sender);
            inner.subscriber_epoch
        };
        let weak: Weak<RefCell<ProviderInner>> = Rc::downgrade(&self.inner);
        IdentitySubscription::new(receiver, move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                // A newer subscription may have replaced this registration.
                if inner.subscriber_epoch == epoch {
                    inner.subscriber = None;
                }
            }
        })
    }

    fn sign_in(&self) -> Result<(), IdentityError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(reason) = inner.next_sign_in_failure.take() {
            return Err(IdentityError::SignInRejected(reason));
        }
        let principal = self.account.borrow().clone();
        inner.session = Some(principal.clone());
        inner.emit(IdentityEvent::SignedIn(principal));
        Ok(())
    }

    fn sign_out(&self) -> Result<(), IdentityError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(reason) = inner.next_sign_out_failure.take() {
            return Err(IdentityError::SignOutRejected(reason));
        }
        inner.session = None;
        inner.emit(IdentityEvent::SignedOut);
        Ok(())
    }
}

/// In-memory role store keyed by principal id.
#[derive(Debug, Default)]
pub struct StaticRoleDirectory {
    roles: RefCell<BTreeMap<String, RoleRecord>>,
    outage: RefCell<Option<String>>,
}

impl StaticRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a role document for one principal.
    pub fn grant(&self, principal_id: impl Into<String>, is_privileged: bool) {
        self.roles
            .borrow_mut()
            .insert(principal_id.into(), RoleRecord { is_privileged });
    }

    /// Removes a principal's role document.
    pub fn revoke(&self, principal_id: &str) {
        self.roles.borrow_mut().remove(principal_id);
    }

    /// Makes every lookup fail until cleared, simulating a store outage.
    pub fn set_outage(&self, reason: Option<String>) {
        *self.outage.borrow_mut() = reason;
    }
}

impl RoleLookup for StaticRoleDirectory {
    fn lookup_role(&self, principal_id: &str) -> Result<Option<RoleRecord>, RoleLookupError> {
        if let Some(reason) = self.outage.borrow().clone() {
            return Err(RoleLookupError::Unavailable(reason));
        }
        Ok(self.roles.borrow().get(principal_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::{LocalIdentityProvider, StaticRoleDirectory};
    use crate::identity::provider::{IdentityError, IdentityEvent, IdentityProvider, RoleLookup};
    use crate::model::identity::Principal;

    fn ada() -> Principal {
        Principal::new("uid-ada", "ada@example.org")
    }

    #[test]
    fn delivers_events_in_provider_order() {
        let provider = LocalIdentityProvider::new(ada());
        let subscription = provider.subscribe();

        provider.sign_in().expect("sign-in succeeds");
        provider.sign_out().expect("sign-out succeeds");

        assert!(matches!(
            subscription.try_next(),
            Some(IdentityEvent::SignedIn(_))
        ));
        assert!(matches!(
            subscription.try_next(),
            Some(IdentityEvent::SignedOut)
        ));
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn cancelled_subscription_receives_nothing_further() {
        let provider = LocalIdentityProvider::new(ada());
        let mut subscription = provider.subscribe();
        subscription.cancel();

        provider.sign_in().expect("sign-in succeeds");
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn resubscribing_replaces_the_old_registration() {
        let provider = LocalIdentityProvider::new(ada());
        let mut first = provider.subscribe();
        let second = provider.subscribe();
        // Cancelling the superseded registration must not detach the new one.
        first.cancel();

        provider.sign_in().expect("sign-in succeeds");
        assert!(first.try_next().is_none());
        assert!(matches!(
            second.try_next(),
            Some(IdentityEvent::SignedIn(_))
        ));
    }

    #[test]
    fn injected_sign_in_failure_is_surfaced_once() {
        let provider = LocalIdentityProvider::new(ada());
        let subscription = provider.subscribe();
        provider.fail_next_sign_in("provider offline");

        let err = provider.sign_in().expect_err("injected failure surfaces");
        assert!(matches!(err, IdentityError::SignInRejected(_)));
        assert!(subscription.try_next().is_none());

        provider.sign_in().expect("next attempt succeeds");
        assert!(subscription.try_next().is_some());
    }

    #[test]
    fn expire_session_emits_signed_out_only_when_signed_in() {
        let provider = LocalIdentityProvider::new(ada());
        let subscription = provider.subscribe();

        provider.expire_session();
        assert!(subscription.try_next().is_none());

        provider.sign_in().expect("sign-in succeeds");
        subscription.try_next();
        provider.expire_session();
        assert!(matches!(
            subscription.try_next(),
            Some(IdentityEvent::SignedOut)
        ));
    }

    #[test]
    fn directory_roles_and_outage() {
        let roles = StaticRoleDirectory::new();
        assert_eq!(roles.lookup_role("uid-ada").expect("lookup works"), None);

        roles.grant("uid-ada", true);
        let record = roles
            .lookup_role("uid-ada")
            .expect("lookup works")
            .expect("role present");
        assert!(record.is_privileged);

        roles.set_outage(Some("network down".to_string()));
        assert!(roles.lookup_role("uid-ada").is_err());
    }
}
