//! Portal session facade.
//!
//! # Responsibility
//! - Wire the privilege context, both record stores, the detail surface and
//!   the persisted preference into one session object.
//! - Pump identity events from the subscription into the context, in
//!   delivery order.
//! - Enforce the cross-component rules no single component can: draft
//!   discard on sign-out, draft discard when the shown record is replaced,
//!   selection clearing on close.
//!
//! # Invariants
//! - The identity-subscription pump is the only writer of privilege state.
//! - With an identity provider attached, the persisted admin-mode flag has
//!   no effect on gating.

use crate::calendar::render::{plan_view, CalendarViewPlan};
use crate::identity::context::{EditAuthority, PrivilegeContext};
use crate::identity::provider::{
    IdentityError, IdentityEvent, IdentityProvider, IdentitySubscription, RoleLookup,
};
use crate::identity::resolver::IdentityResolver;
use crate::model::identity::PrivilegeState;
use crate::model::record::{Record, RecordKind};
use crate::prefs::AdminModePreference;
use crate::store::record_store::{
    CommitOutcome, EditableRecordStore, RecordField, StoreResult,
};
use crate::surface::detail::{DetailPhase, DetailSurface, ShownRecord, SurfaceError};
use log::info;
use std::rc::Rc;

struct IdentityRig {
    context: PrivilegeContext,
    resolver: IdentityResolver,
    subscription: Option<IdentitySubscription>,
}

/// One viewer's portal session: privilege, content, edit surface.
pub struct PortalSession {
    identity: Option<IdentityRig>,
    admin_pref: AdminModePreference,
    announcements: EditableRecordStore,
    events: EditableRecordStore,
    surface: DetailSurface,
}

impl PortalSession {
    /// Starts a session bound to the identity and role-store collaborators.
    ///
    /// Subscribes to identity changes exactly once; the subscription is
    /// released by [`shutdown`](Self::shutdown) or drop.
    pub fn start(
        provider: Rc<dyn IdentityProvider>,
        roles: Rc<dyn RoleLookup>,
        admin_pref: AdminModePreference,
    ) -> Self {
        let subscription = provider.subscribe();
        info!("event=portal_start module=portal status=ok mode=identity");
        Self {
            identity: Some(IdentityRig {
                context: PrivilegeContext::new(provider),
                resolver: IdentityResolver::new(roles),
                subscription: Some(subscription),
            }),
            admin_pref,
            announcements: EditableRecordStore::announcements(),
            events: EditableRecordStore::calendar_events(),
            surface: DetailSurface::new(),
        }
    }

    /// Starts a session without an identity collaborator; the persisted
    /// admin-mode flag is the only gate (legacy/offline fallback).
    pub fn offline(admin_pref: AdminModePreference) -> Self {
        info!("event=portal_start module=portal status=ok mode=offline");
        Self {
            identity: None,
            admin_pref,
            announcements: EditableRecordStore::announcements(),
            events: EditableRecordStore::calendar_events(),
            surface: DetailSurface::new(),
        }
    }

    /// Drains pending identity events and applies them in delivery order.
    ///
    /// Each sign-in flows through the resolver before the next event is
    /// taken; a sign-out additionally discards every active draft and drops
    /// the surface out of edit mode. Returns the number of events applied.
    pub fn process_identity_events(&mut self) -> usize {
        let Some(rig) = self.identity.as_mut() else {
            return 0;
        };
        let Some(subscription) = rig.subscription.as_ref() else {
            return 0;
        };

        let mut applied = 0;
        while let Some(event) = subscription.try_next() {
            applied += 1;
            let signed_out = matches!(event, IdentityEvent::SignedOut);
            if let Some(probe) = rig.context.handle_identity_change(event) {
                let resolution = rig.resolver.resolve(&probe);
                rig.context.apply_role_resolution(resolution);
            }
            if signed_out {
                self.announcements.cancel();
                self.events.cancel();
                self.surface.abandon_editing();
            }
        }
        applied
    }

    /// Releases the identity subscription. Reads keep working; no further
    /// identity events will arrive.
    pub fn shutdown(&mut self) {
        if let Some(rig) = self.identity.as_mut() {
            if let Some(mut subscription) = rig.subscription.take() {
                subscription.cancel();
                info!("event=portal_shutdown module=portal status=ok");
            }
        }
    }

    pub fn sign_in(&self) -> Result<(), IdentityError> {
        match &self.identity {
            Some(rig) => rig.context.sign_in(),
            None => Err(IdentityError::ProviderUnattached),
        }
    }

    pub fn sign_out(&self) -> Result<(), IdentityError> {
        match &self.identity {
            Some(rig) => rig.context.sign_out(),
            None => Err(IdentityError::ProviderUnattached),
        }
    }

    /// Current privilege state; `None` for offline sessions.
    pub fn privilege_state(&self) -> Option<&PrivilegeState> {
        self.identity.as_ref().map(|rig| rig.context.state())
    }

    /// Whether editing affordances should be enabled right now.
    pub fn edit_allowed(&self) -> bool {
        active_authority(&self.identity, &self.admin_pref).edit_allowed()
    }

    pub fn admin_mode(&self) -> bool {
        self.admin_pref.enabled()
    }

    /// Flips the persisted admin-mode toggle. Gates nothing while an
    /// identity provider is attached.
    pub fn set_admin_mode(&mut self, enabled: bool) {
        self.admin_pref.set(enabled);
    }

    pub fn announcements(&self) -> &EditableRecordStore {
        &self.announcements
    }

    pub fn calendar_events(&self) -> &EditableRecordStore {
        &self.events
    }

    pub fn seed_announcements(&mut self, records: Vec<Record>) -> StoreResult<()> {
        self.announcements.seed(records)
    }

    pub fn seed_calendar_events(&mut self, records: Vec<Record>) -> StoreResult<()> {
        self.events.seed(records)
    }

    pub fn insert_announcement(&mut self, record: Record) -> StoreResult<()> {
        let authority = active_authority(&self.identity, &self.admin_pref);
        self.announcements.insert(authority, record)
    }

    pub fn insert_calendar_event(&mut self, record: Record) -> StoreResult<()> {
        let authority = active_authority(&self.identity, &self.admin_pref);
        self.events.insert(authority, record)
    }

    /// Render input for the calendar widget, derived from the current
    /// event collection.
    pub fn calendar_view_plan(&self) -> CalendarViewPlan {
        plan_view(self.events.records())
    }

    /// Click on a rendered event. Unknown ids are ignored; a known id
    /// becomes the selection and opens the detail surface in read mode.
    pub fn handle_event_click(&mut self, id: &str) -> bool {
        if !self.events.contains(id) {
            return false;
        }
        self.open_detail(RecordKind::CalendarEvent, id);
        true
    }

    /// Opens an announcement in the detail surface.
    pub fn open_announcement(&mut self, id: &str) -> bool {
        if !self.announcements.contains(id) {
            return false;
        }
        self.open_detail(RecordKind::Announcement, id);
        true
    }

    /// Replaces the shown record, discarding the superseded record's
    /// unsaved draft without confirmation.
    fn open_detail(&mut self, kind: RecordKind, id: &str) {
        if let Some(previous) = self.surface.shown().cloned() {
            self.store_mut(previous.kind).cancel_if_editing(&previous.id);
        }
        self.surface.open(kind, id);
    }

    pub fn begin_editing(&mut self) -> Result<(), SurfaceError> {
        let kind = self.shown_kind()?;
        let authority = active_authority(&self.identity, &self.admin_pref);
        match kind {
            RecordKind::Announcement => self.surface.begin_editing(&mut self.announcements, authority),
            RecordKind::CalendarEvent => self.surface.begin_editing(&mut self.events, authority),
        }
    }

    pub fn edit_field(
        &mut self,
        field: RecordField,
        value: impl Into<String>,
    ) -> Result<(), SurfaceError> {
        let kind = self.shown_kind()?;
        match kind {
            RecordKind::Announcement => {
                self.surface.edit_field(&mut self.announcements, field, value)
            }
            RecordKind::CalendarEvent => self.surface.edit_field(&mut self.events, field, value),
        }
    }

    pub fn commit_edits(&mut self) -> Result<CommitOutcome, SurfaceError> {
        let kind = self.shown_kind()?;
        let authority = active_authority(&self.identity, &self.admin_pref);
        match kind {
            RecordKind::Announcement => self.surface.commit_edits(&mut self.announcements, authority),
            RecordKind::CalendarEvent => self.surface.commit_edits(&mut self.events, authority),
        }
    }

    pub fn cancel_editing(&mut self) -> Result<(), SurfaceError> {
        let kind = self.shown_kind()?;
        match kind {
            RecordKind::Announcement => self.surface.cancel_editing(&mut self.announcements),
            RecordKind::CalendarEvent => self.surface.cancel_editing(&mut self.events),
        }
    }

    /// Dismisses the detail surface, clearing selection and draft.
    /// Idempotent when nothing is open.
    pub fn close_detail(&mut self) {
        if let Some(shown) = self.surface.shown().cloned() {
            match shown.kind {
                RecordKind::Announcement => self.surface.close(&mut self.announcements),
                RecordKind::CalendarEvent => self.surface.close(&mut self.events),
            }
        }
    }

    pub fn detail_phase(&self) -> DetailPhase {
        self.surface.phase()
    }

    pub fn shown(&self) -> Option<&ShownRecord> {
        self.surface.shown()
    }

    /// Calendar selection state.
    pub fn selected_event_id(&self) -> Option<&str> {
        self.surface.selected_event_id()
    }

    fn shown_kind(&self) -> Result<RecordKind, SurfaceError> {
        self.surface
            .shown()
            .map(|shown| shown.kind)
            .ok_or(SurfaceError::NotOpen)
    }

    fn store_mut(&mut self, kind: RecordKind) -> &mut EditableRecordStore {
        match kind {
            RecordKind::Announcement => &mut self.announcements,
            RecordKind::CalendarEvent => &mut self.events,
        }
    }
}

impl Drop for PortalSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The identity-derived privilege is authoritative whenever a provider is
/// attached; the persisted flag only gates offline sessions.
fn active_authority<'a>(
    identity: &'a Option<IdentityRig>,
    admin_pref: &'a AdminModePreference,
) -> &'a dyn EditAuthority {
    match identity {
        Some(rig) => &rig.context,
        None => admin_pref,
    }
}
