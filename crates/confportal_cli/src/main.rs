//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive the portal core end-to-end on in-process collaborators.
//! - Keep output deterministic for quick local sanity checks.

use confportal_core::{
    AdminModePreference, LocalIdentityProvider, PortalSession, Principal, Record, RecordField,
    StaticRoleDirectory,
};
use std::rc::Rc;

fn main() {
    println!("confportal_core version={}", confportal_core::core_version());

    let provider = Rc::new(LocalIdentityProvider::new(Principal::new(
        "uid-organizer",
        "organizer@example.org",
    )));
    let roles = Rc::new(StaticRoleDirectory::new());
    roles.grant("uid-organizer", true);

    let mut portal = PortalSession::start(provider, roles, AdminModePreference::in_memory());

    portal
        .seed_announcements(vec![
            Record::announcement("Welcome to NSA Conf!", "Conference starts next week. Get ready!"),
            Record::announcement("Schedule Released", "Check out the full schedule on our website."),
            Record::announcement("Keynote Speaker", "Dr. Jane Doe will deliver the keynote address."),
        ])
        .expect("announcement seed is valid");
    portal
        .seed_calendar_events(vec![
            Record::calendar_event(
                "Opening Keynote",
                "Hear from our opening speaker about the state of security.",
                "2025-06-10",
            ),
            Record::calendar_event(
                "Networking Lunch",
                "Casual lunch and networking with peers.",
                "2025-06-11",
            ),
            Record::calendar_event(
                "Workshop: Security",
                "Hands-on workshop covering modern security practices.",
                "2025-06-12",
            ),
        ])
        .expect("event seed is valid");

    let plan = portal.calendar_view_plan();
    println!(
        "calendar mode={:?} range={:?} events={}",
        plan.mode,
        plan.visible_range,
        plan.events.len()
    );

    println!("edit_allowed before sign-in: {}", portal.edit_allowed());
    portal.sign_in().expect("local provider accepts sign-in");
    portal.process_identity_events();
    println!("edit_allowed after sign-in:  {}", portal.edit_allowed());

    let keynote_id = portal.calendar_events().records()[0].id.clone();
    assert!(portal.handle_event_click(&keynote_id));
    portal.begin_editing().expect("privileged edit begins");
    portal
        .edit_field(RecordField::Title, "Opening Keynote (rescheduled)")
        .expect("draft update");
    portal.commit_edits().expect("commit applies");
    portal.close_detail();

    let keynote = portal
        .calendar_events()
        .get(&keynote_id)
        .expect("keynote still present");
    println!("committed title: {}", keynote.title);

    portal.sign_out().expect("local provider accepts sign-out");
    portal.process_identity_events();
    println!("edit_allowed after sign-out: {}", portal.edit_allowed());
}
