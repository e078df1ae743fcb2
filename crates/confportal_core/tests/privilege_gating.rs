use confportal_core::{
    AdminModePreference, IdentityError, IdentityEvent, IdentityResolver, LocalIdentityProvider,
    PortalSession, Principal, PrivilegeContext, RoleProbe, StaticRoleDirectory,
};
use std::rc::Rc;

fn organizer() -> Principal {
    Principal::new("uid-organizer", "organizer@example.org")
}

fn attendee() -> Principal {
    Principal::new("uid-attendee", "attendee@example.org")
}

fn portal_with(
    roles: Rc<StaticRoleDirectory>,
) -> (PortalSession, Rc<LocalIdentityProvider>) {
    let provider = Rc::new(LocalIdentityProvider::new(organizer()));
    let portal = PortalSession::start(
        provider.clone(),
        roles,
        AdminModePreference::in_memory(),
    );
    (portal, provider)
}

#[test]
fn absent_role_document_leaves_viewer_unprivileged() {
    let roles = Rc::new(StaticRoleDirectory::new());
    let (mut portal, _provider) = portal_with(roles);

    portal.sign_in().unwrap();
    assert_eq!(portal.process_identity_events(), 1);

    let state = portal.privilege_state().expect("identity session");
    assert!(state.principal().is_some());
    assert!(!state.is_privileged());
    assert!(!portal.edit_allowed());
}

#[test]
fn granted_role_enables_privileged_actions_until_sign_out() {
    let roles = Rc::new(StaticRoleDirectory::new());
    roles.grant("uid-organizer", true);
    let (mut portal, _provider) = portal_with(roles);

    portal.sign_in().unwrap();
    portal.process_identity_events();
    assert!(portal.edit_allowed());

    portal.sign_out().unwrap();
    portal.process_identity_events();
    let state = portal.privilege_state().expect("identity session");
    assert!(state.principal().is_none());
    assert!(!state.is_privileged());
    assert!(!portal.edit_allowed());
}

#[test]
fn role_store_outage_fails_closed_and_recovers() {
    let roles = Rc::new(StaticRoleDirectory::new());
    roles.grant("uid-organizer", true);
    let (mut portal, provider) = portal_with(roles.clone());

    roles.set_outage(Some("store offline".to_string()));
    portal.sign_in().unwrap();
    portal.process_identity_events();
    assert!(!portal.edit_allowed());

    roles.set_outage(None);
    provider.sign_in_as(organizer());
    portal.process_identity_events();
    assert!(portal.edit_allowed());
}

#[test]
fn sign_in_failure_is_surfaced_without_state_change() {
    let roles = Rc::new(StaticRoleDirectory::new());
    let (mut portal, provider) = portal_with(roles);
    provider.fail_next_sign_in("provider offline");

    let err = portal.sign_in().unwrap_err();
    assert!(matches!(err, IdentityError::SignInRejected(_)));
    assert_eq!(portal.process_identity_events(), 0);
    let state = portal.privilege_state().expect("identity session");
    assert!(state.principal().is_none());
}

#[test]
fn account_switch_before_processing_settles_on_the_last_principal() {
    let roles = Rc::new(StaticRoleDirectory::new());
    roles.grant("uid-organizer", true);
    let (mut portal, provider) = portal_with(roles);

    // Both events queue before the pump runs; they apply in provider order.
    provider.sign_in_as(organizer());
    provider.sign_in_as(attendee());
    assert_eq!(portal.process_identity_events(), 2);

    let state = portal.privilege_state().expect("identity session");
    assert_eq!(
        state.principal().map(Principal::id),
        Some("uid-attendee")
    );
    assert!(!state.is_privileged());
}

#[test]
fn stale_resolution_for_a_superseded_principal_is_discarded() {
    // Split-phase application: the organizer's lookup completes only after
    // the attendee signed in.
    let roles = Rc::new(StaticRoleDirectory::new());
    roles.grant("uid-organizer", true);
    let resolver = IdentityResolver::new(roles);
    let provider = Rc::new(LocalIdentityProvider::new(organizer()));
    let mut context = PrivilegeContext::new(provider);

    let organizer_probe = context
        .handle_identity_change(IdentityEvent::SignedIn(organizer()))
        .expect("sign-in yields a probe");
    context
        .handle_identity_change(IdentityEvent::SignedIn(attendee()))
        .expect("sign-in yields a probe");

    // Late answer for the superseded principal, privileged no less.
    context.apply_role_resolution(resolver.resolve(&organizer_probe));
    assert!(!context.is_privileged());
    assert_eq!(context.principal().map(Principal::id), Some("uid-attendee"));
}

#[test]
fn resolution_after_sign_out_never_grants_privilege() {
    let roles = Rc::new(StaticRoleDirectory::new());
    roles.grant("uid-organizer", true);
    let resolver = IdentityResolver::new(roles);
    let provider = Rc::new(LocalIdentityProvider::new(organizer()));
    let mut context = PrivilegeContext::new(provider);

    let probe = context
        .handle_identity_change(IdentityEvent::SignedIn(organizer()))
        .expect("sign-in yields a probe");
    context.handle_identity_change(IdentityEvent::SignedOut);
    context.apply_role_resolution(resolver.resolve(&probe));

    assert!(context.principal().is_none());
    assert!(!context.is_privileged());
}

#[test]
fn privilege_requires_a_resolution_for_the_current_principal() {
    // Direct split-phase check of the only path to privileged=true.
    let provider = Rc::new(LocalIdentityProvider::new(organizer()));
    let mut context = PrivilegeContext::new(provider);

    context.handle_identity_change(IdentityEvent::SignedIn(organizer()));
    assert!(!context.is_privileged());
    assert!(context.is_resolving());

    context.apply_role_resolution(confportal_core::RoleResolution {
        principal_id: "uid-organizer".to_string(),
        is_privileged: true,
    });
    assert!(context.is_privileged());
}

#[test]
fn probe_names_the_principal_it_was_raised_for() {
    let provider = Rc::new(LocalIdentityProvider::new(organizer()));
    let mut context = PrivilegeContext::new(provider);
    let probe: RoleProbe = context
        .handle_identity_change(IdentityEvent::SignedIn(attendee()))
        .expect("sign-in yields a probe");
    assert_eq!(probe.principal_id, "uid-attendee");
}
