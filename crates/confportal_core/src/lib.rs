//! Core domain logic for the conference portal.
//! This crate is the single source of truth for the role-gated editable
//! state behind the announcements feed and the event calendar.

pub mod calendar;
pub mod identity;
pub mod logging;
pub mod model;
pub mod portal;
pub mod prefs;
pub mod store;
pub mod surface;

pub use calendar::date_window::{compact_window, DateWindow, COMPACT_WINDOW_MAX_DAYS};
pub use calendar::render::{plan_view, CalendarViewMode, CalendarViewPlan, DateSpan};
pub use identity::context::{EditAuthority, PrivilegeContext};
pub use identity::local::{LocalIdentityProvider, StaticRoleDirectory};
pub use identity::provider::{
    IdentityError, IdentityEvent, IdentityProvider, IdentitySubscription, RoleLookup,
    RoleLookupError, RoleRecord,
};
pub use identity::resolver::{IdentityResolver, RoleProbe, RoleResolution};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::identity::{Principal, PrivilegeState};
pub use model::record::{Record, RecordId, RecordKind, RecordValidationError};
pub use portal::PortalSession;
pub use prefs::{AdminModePreference, PrefError, PrefResult, PreferenceStore, SqlitePreferenceStore};
pub use store::record_store::{
    CommitOutcome, Draft, DraftFields, EditableRecordStore, RecordField, StoreError, StoreResult,
};
pub use surface::detail::{DetailPhase, DetailSurface, ShownRecord, SurfaceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
