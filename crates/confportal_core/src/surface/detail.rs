//! Modal detail surface state machine.
//!
//! Phases per invocation: `Closed -> Reading -> Editing -> Closed`, with
//! `Reading -> Closed` reachable directly. Draft ownership stays with the
//! backing store; this machine keeps its phase in lockstep with the store's
//! draft slot.
//!
//! # Invariants
//! - `Editing` is only reachable while the authority allows edits; privilege
//!   is re-checked by the store at commit time, not just at entry.
//! - Cancelling is possible in `Editing` regardless of current privilege.
//! - Closing clears the selection and the draft for the shown record.

use crate::identity::context::EditAuthority;
use crate::model::record::{RecordId, RecordKind};
use crate::store::record_store::{
    CommitOutcome, EditableRecordStore, RecordField, StoreError,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle phase of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    Closed,
    Reading,
    Editing,
}

/// Selection state: which record the surface currently presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownRecord {
    pub kind: RecordKind,
    pub id: RecordId,
}

/// Surface transition failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface is closed; there is nothing to act on.
    NotOpen,
    /// The operation requires edit mode.
    NotEditing,
    /// Edit mode is already active.
    AlreadyEditing,
    /// The provided store does not hold the shown record's collection.
    WrongStore { shown: RecordKind, store: RecordKind },
    Store(StoreError),
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "detail surface is closed"),
            Self::NotEditing => write!(f, "detail surface is not in edit mode"),
            Self::AlreadyEditing => write!(f, "detail surface is already in edit mode"),
            Self::WrongStore { shown, store } => {
                write!(f, "store of kind {store:?} cannot back a shown {shown:?}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SurfaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SurfaceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Modal presentation of one announcement or calendar-event record.
#[derive(Debug, Default)]
pub struct DetailSurface {
    shown: Option<ShownRecord>,
    editing: bool,
}

impl DetailSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DetailPhase {
        match (&self.shown, self.editing) {
            (None, _) => DetailPhase::Closed,
            (Some(_), true) => DetailPhase::Editing,
            (Some(_), false) => DetailPhase::Reading,
        }
    }

    /// The record currently presented, if any.
    pub fn shown(&self) -> Option<&ShownRecord> {
        self.shown.as_ref()
    }

    /// Calendar selection state: the shown calendar-event id.
    pub fn selected_event_id(&self) -> Option<&str> {
        self.shown
            .as_ref()
            .filter(|shown| shown.kind == RecordKind::CalendarEvent)
            .map(|shown| shown.id.as_str())
    }

    /// Presents a record in read mode, replacing whatever was shown.
    ///
    /// Callers owning the stores must discard the superseded record's draft
    /// first (`PortalSession::open_detail` does); the surface itself only
    /// tracks phase and selection.
    pub fn open(&mut self, kind: RecordKind, id: impl Into<RecordId>) {
        self.shown = Some(ShownRecord {
            kind,
            id: id.into(),
        });
        self.editing = false;
    }

    /// Switches the shown record into edit mode.
    ///
    /// Fails without a phase change when the surface is closed, already
    /// editing, or the store rejects `begin_edit` (unprivileged viewer,
    /// busy draft slot, vanished record).
    pub fn begin_editing(
        &mut self,
        store: &mut EditableRecordStore,
        authority: &dyn EditAuthority,
    ) -> Result<(), SurfaceError> {
        let shown = self.shown.as_ref().ok_or(SurfaceError::NotOpen)?;
        if self.editing {
            return Err(SurfaceError::AlreadyEditing);
        }
        if store.kind() != shown.kind {
            return Err(SurfaceError::WrongStore {
                shown: shown.kind,
                store: store.kind(),
            });
        }
        store.begin_edit(authority, &shown.id)?;
        self.editing = true;
        Ok(())
    }

    /// Routes one field edit into the active draft.
    pub fn edit_field(
        &mut self,
        store: &mut EditableRecordStore,
        field: RecordField,
        value: impl Into<String>,
    ) -> Result<(), SurfaceError> {
        self.require_editing()?;
        store.update_draft_field(field, value)?;
        Ok(())
    }

    /// Commits the active draft and returns to read mode.
    ///
    /// The store re-checks privilege here; a rejected commit leaves the
    /// surface in edit mode with the draft intact, so cancelling remains
    /// possible after a mid-edit privilege revocation.
    pub fn commit_edits(
        &mut self,
        store: &mut EditableRecordStore,
        authority: &dyn EditAuthority,
    ) -> Result<CommitOutcome, SurfaceError> {
        self.require_editing()?;
        let outcome = store.commit(authority)?;
        self.editing = false;
        Ok(outcome)
    }

    /// Discards the draft and returns to read mode. Allowed regardless of
    /// current privilege.
    pub fn cancel_editing(
        &mut self,
        store: &mut EditableRecordStore,
    ) -> Result<(), SurfaceError> {
        self.require_editing()?;
        if let Some(shown) = self.shown.as_ref() {
            store.cancel_if_editing(&shown.id);
        }
        self.editing = false;
        Ok(())
    }

    /// Drops edit mode without touching the store.
    ///
    /// Used when the draft is already gone, e.g. after a sign-out discarded
    /// every draft.
    pub fn abandon_editing(&mut self) {
        self.editing = false;
    }

    /// Dismisses the surface, clearing the selection and any draft for the
    /// shown record. Idempotent when already closed.
    pub fn close(&mut self, store: &mut EditableRecordStore) {
        if let Some(shown) = self.shown.take() {
            store.cancel_if_editing(&shown.id);
        }
        self.editing = false;
    }

    fn require_editing(&self) -> Result<(), SurfaceError> {
        match self.phase() {
            DetailPhase::Closed => Err(SurfaceError::NotOpen),
            DetailPhase::Reading => Err(SurfaceError::NotEditing),
            DetailPhase::Editing => Ok(()),
        }
    }
}
