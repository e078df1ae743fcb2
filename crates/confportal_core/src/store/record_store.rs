//! Ordered record collection with a single-record draft slot.
//!
//! # Responsibility
//! - Own one collection (announcements or calendar events) exclusively.
//! - Accept gated mutations: insert, begin-edit, draft updates, commit.
//!
//! # Invariants
//! - Record ids are unique within the collection.
//! - Records keep their position across commits; insertion order is display
//!   order for announcements.
//! - A commit whose target id vanished is dropped without touching the
//!   collection.

use crate::identity::context::EditAuthority;
use crate::model::record::{Record, RecordId, RecordKind, RecordValidationError};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Mutation failures surfaced to the edit surface.
///
/// `NotPermitted` and `DraftActive` back disabled affordances in the UI; the
/// store itself is unchanged by every error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The current viewer has no edit privilege.
    NotPermitted,
    /// Another record is already being edited.
    DraftActive(RecordId),
    /// The operation needs an active draft and none exists.
    NoActiveDraft,
    RecordNotFound(RecordId),
    DuplicateId(RecordId),
    /// The record belongs to the other collection.
    KindMismatch {
        expected: RecordKind,
        actual: RecordKind,
    },
    Validation(RecordValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPermitted => write!(f, "viewer has no edit privilege"),
            Self::DraftActive(id) => write!(f, "another draft is already active: {id}"),
            Self::NoActiveDraft => write!(f, "no draft is active"),
            Self::RecordNotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateId(id) => write!(f, "record id already present: {id}"),
            Self::KindMismatch { expected, actual } => {
                write!(f, "record kind {actual:?} does not match store kind {expected:?}")
            }
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Editable field address inside a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Title,
    Body,
    Date,
    Location,
}

/// Working copy of one record's editable fields.
///
/// Seeded from the committed record when the edit begins; committing merges
/// it back, so fields the editor never touched keep their prior values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftFields {
    pub title: String,
    pub body: String,
    pub date: Option<String>,
    pub location: Option<String>,
}

impl DraftFields {
    fn seeded_from(record: &Record) -> Self {
        Self {
            title: record.title.clone(),
            body: record.body.clone(),
            date: record.date.clone(),
            location: record.location.clone(),
        }
    }
}

/// In-progress edit of exactly one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    target_id: RecordId,
    fields: DraftFields,
}

impl Draft {
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn fields(&self) -> &DraftFields {
        &self.fields
    }
}

/// Disposition of a commit attempt that was accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The draft was merged into its target record.
    Applied(RecordId),
    /// The target id no longer exists; the commit was dropped and the draft
    /// cleared.
    DroppedStaleTarget(RecordId),
}

/// Ordered, kind-homogeneous record collection plus one draft slot.
pub struct EditableRecordStore {
    kind: RecordKind,
    records: Vec<Record>,
    draft: Option<Draft>,
}

impl EditableRecordStore {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            draft: None,
        }
    }

    pub fn announcements() -> Self {
        Self::new(RecordKind::Announcement)
    }

    pub fn calendar_events() -> Self {
        Self::new(RecordKind::CalendarEvent)
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Committed records in display order. Draft edits are not visible here
    /// until committed.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Replaces the whole collection with a document-store snapshot.
    ///
    /// # Contract
    /// - Every record must validate and match the store kind; ids must be
    ///   unique. Any rejection leaves the previous collection intact.
    /// - An active draft is discarded; its basis is gone.
    pub fn seed(&mut self, records: Vec<Record>) -> StoreResult<()> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for record in &records {
            self.check_admissible(record)?;
            if !seen.insert(record.id.as_str()) {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
        }
        if let Some(draft) = self.draft.take() {
            warn!(
                "event=draft_discarded module=store status=seed_replaced target={}",
                draft.target_id
            );
        }
        self.records = records;
        Ok(())
    }

    /// Appends one record; display order is insertion order.
    pub fn insert(&mut self, authority: &dyn EditAuthority, record: Record) -> StoreResult<()> {
        if !authority.edit_allowed() {
            debug!("event=insert module=store status=denied");
            return Err(StoreError::NotPermitted);
        }
        self.check_admissible(&record)?;
        if self.contains(&record.id) {
            return Err(StoreError::DuplicateId(record.id.clone()));
        }
        info!(
            "event=insert module=store status=ok kind={:?} record={}",
            self.kind, record.id
        );
        self.records.push(record);
        Ok(())
    }

    /// Opens a draft for one record, seeded from its committed fields.
    ///
    /// Rejected without side effects when the viewer is unprivileged, a
    /// draft is already active, or the id is unknown.
    pub fn begin_edit(&mut self, authority: &dyn EditAuthority, id: &str) -> StoreResult<()> {
        if !authority.edit_allowed() {
            debug!("event=begin_edit module=store status=denied record={id}");
            return Err(StoreError::NotPermitted);
        }
        if let Some(draft) = &self.draft {
            return Err(StoreError::DraftActive(draft.target_id.clone()));
        }
        let record = self
            .get(id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;
        self.draft = Some(Draft {
            target_id: record.id.clone(),
            fields: DraftFields::seeded_from(record),
        });
        debug!("event=begin_edit module=store status=ok record={id}");
        Ok(())
    }

    /// Updates one field of the active draft. The committed collection is
    /// never touched here.
    ///
    /// An empty value clears the optional `Date` and `Location` fields.
    pub fn update_draft_field(
        &mut self,
        field: RecordField,
        value: impl Into<String>,
    ) -> StoreResult<()> {
        let draft = self.draft.as_mut().ok_or(StoreError::NoActiveDraft)?;
        let value = value.into();
        match field {
            RecordField::Title => draft.fields.title = value,
            RecordField::Body => draft.fields.body = value,
            RecordField::Date => draft.fields.date = non_empty(value),
            RecordField::Location => draft.fields.location = non_empty(value),
        }
        Ok(())
    }

    /// Merges the active draft into its target record.
    ///
    /// # Contract
    /// - Privilege is re-checked here, not just at `begin_edit`; rejection
    ///   keeps the draft so the editor can still cancel.
    /// - A merged record that fails validation keeps the draft for
    ///   correction.
    /// - A vanished target drops the commit silently and clears the draft.
    pub fn commit(&mut self, authority: &dyn EditAuthority) -> StoreResult<CommitOutcome> {
        if !authority.edit_allowed() {
            debug!("event=commit module=store status=denied");
            return Err(StoreError::NotPermitted);
        }
        let draft = self.draft.as_ref().ok_or(StoreError::NoActiveDraft)?;
        let target_id = draft.target_id.clone();

        let position = self
            .records
            .iter()
            .position(|record| record.id == target_id);
        let Some(position) = position else {
            self.draft = None;
            warn!(
                "event=commit module=store status=stale_target_dropped record={target_id}"
            );
            return Ok(CommitOutcome::DroppedStaleTarget(target_id));
        };

        let merged = merge_into(&self.records[position], &draft.fields);
        merged.validate()?;

        let id = merged.id.clone();
        self.records[position] = merged;
        self.draft = None;
        info!(
            "event=commit module=store status=ok kind={:?} record={id}",
            self.kind
        );
        Ok(CommitOutcome::Applied(id))
    }

    /// Clears the draft without touching the collection. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(draft) = self.draft.take() {
            debug!(
                "event=cancel_edit module=store status=ok record={}",
                draft.target_id
            );
        }
    }

    /// Clears the draft only when it targets `id`.
    pub fn cancel_if_editing(&mut self, id: &str) {
        if self.draft.as_ref().is_some_and(|draft| draft.target_id == id) {
            self.cancel();
        }
    }

    fn check_admissible(&self, record: &Record) -> StoreResult<()> {
        record.validate()?;
        if record.kind != self.kind {
            return Err(StoreError::KindMismatch {
                expected: self.kind,
                actual: record.kind,
            });
        }
        Ok(())
    }
}

/// Merges draft fields over a committed record, keeping id and kind.
fn merge_into(existing: &Record, fields: &DraftFields) -> Record {
    Record {
        id: existing.id.clone(),
        kind: existing.kind,
        title: fields.title.clone(),
        body: fields.body.clone(),
        date: fields.date.clone(),
        location: fields.location.clone(),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitOutcome, EditableRecordStore, RecordField, StoreError};
    use crate::identity::context::EditAuthority;
    use crate::model::record::Record;

    struct Permit(bool);

    impl EditAuthority for Permit {
        fn edit_allowed(&self) -> bool {
            self.0
        }
    }

    fn seeded_store() -> EditableRecordStore {
        let mut store = EditableRecordStore::calendar_events();
        store
            .seed(vec![
                Record::calendar_event("Opening Keynote", "State of security.", "2025-01-02"),
                Record::calendar_event("Networking Lunch", "Casual lunch.", "2025-01-03"),
            ])
            .expect("seed succeeds");
        store
    }

    #[test]
    fn begin_edit_requires_privilege_and_leaves_no_draft() {
        let mut store = seeded_store();
        let id = store.records()[0].id.clone();
        let err = store
            .begin_edit(&Permit(false), &id)
            .expect_err("unprivileged begin must fail");
        assert_eq!(err, StoreError::NotPermitted);
        assert!(store.draft().is_none());
    }

    #[test]
    fn second_begin_edit_is_rejected_while_a_draft_is_active() {
        let mut store = seeded_store();
        let first = store.records()[0].id.clone();
        let second = store.records()[1].id.clone();
        store
            .begin_edit(&Permit(true), &first)
            .expect("first begin succeeds");
        let err = store
            .begin_edit(&Permit(true), &second)
            .expect_err("second begin must fail");
        assert_eq!(err, StoreError::DraftActive(first));
    }

    #[test]
    fn draft_updates_do_not_leak_into_reads() {
        let mut store = seeded_store();
        let id = store.records()[0].id.clone();
        store.begin_edit(&Permit(true), &id).expect("begin succeeds");
        store
            .update_draft_field(RecordField::Title, "Revised Keynote")
            .expect("draft update succeeds");

        assert_eq!(store.get(&id).expect("record present").title, "Opening Keynote");
        assert_eq!(store.draft().expect("draft active").fields().title, "Revised Keynote");
    }

    #[test]
    fn commit_merges_by_position_and_keeps_id() {
        let mut store = seeded_store();
        let id = store.records()[0].id.clone();
        store.begin_edit(&Permit(true), &id).expect("begin succeeds");
        store
            .update_draft_field(RecordField::Title, "Revised Keynote")
            .expect("draft update succeeds");
        store
            .update_draft_field(RecordField::Location, "Hall A")
            .expect("draft update succeeds");

        let outcome = store.commit(&Permit(true)).expect("commit succeeds");
        assert_eq!(outcome, CommitOutcome::Applied(id.clone()));

        let record = &store.records()[0];
        assert_eq!(record.id, id);
        assert_eq!(record.title, "Revised Keynote");
        assert_eq!(record.location.as_deref(), Some("Hall A"));
        // Untouched fields keep their prior values.
        assert_eq!(record.body, "State of security.");
        assert_eq!(record.date.as_deref(), Some("2025-01-02"));
        assert!(store.draft().is_none());
    }

    #[test]
    fn commit_without_privilege_keeps_the_draft() {
        let mut store = seeded_store();
        let id = store.records()[0].id.clone();
        store.begin_edit(&Permit(true), &id).expect("begin succeeds");

        let err = store
            .commit(&Permit(false))
            .expect_err("revoked commit must fail");
        assert_eq!(err, StoreError::NotPermitted);
        assert!(store.draft().is_some());
    }

    #[test]
    fn commit_against_vanished_target_is_dropped_silently() {
        let mut store = seeded_store();
        let id = store.records()[0].id.clone();
        store.begin_edit(&Permit(true), &id).expect("begin succeeds");
        // Simulate the target disappearing under the draft.
        let remaining = vec![store.records()[1].clone()];
        let snapshot = remaining.clone();
        store.records = remaining;

        let outcome = store.commit(&Permit(true)).expect("commit is tolerated");
        assert_eq!(outcome, CommitOutcome::DroppedStaleTarget(id));
        assert!(store.draft().is_none());
        assert_eq!(store.records(), snapshot.as_slice());
    }

    #[test]
    fn invalid_merged_record_keeps_the_draft_for_correction() {
        let mut store = seeded_store();
        let id = store.records()[0].id.clone();
        store.begin_edit(&Permit(true), &id).expect("begin succeeds");
        store
            .update_draft_field(RecordField::Date, "not-a-date")
            .expect("draft update succeeds");

        let err = store.commit(&Permit(true)).expect_err("bad date must fail");
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.draft().is_some());
        assert_eq!(store.get(&id).expect("record present").date.as_deref(), Some("2025-01-02"));
    }

    #[test]
    fn seed_rejects_duplicate_ids_atomically() {
        let mut store = seeded_store();
        let before: Vec<_> = store.records().to_vec();
        let duplicate = Record::with_id(
            before[0].id.clone(),
            crate::model::record::RecordKind::CalendarEvent,
            "Clone",
        );
        let err = store
            .seed(vec![before[0].clone(), duplicate])
            .expect_err("duplicate ids must fail");
        assert!(matches!(err, StoreError::DuplicateId(_)));
        assert_eq!(store.records(), before.as_slice());
    }

    #[test]
    fn insert_appends_in_display_order() {
        let mut store = EditableRecordStore::announcements();
        store
            .insert(&Permit(true), Record::announcement("First", "a"))
            .expect("insert succeeds");
        store
            .insert(&Permit(true), Record::announcement("Second", "b"))
            .expect("insert succeeds");
        let titles: Vec<_> = store.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);

        let err = store
            .insert(&Permit(false), Record::announcement("Third", "c"))
            .expect_err("unprivileged insert must fail");
        assert_eq!(err, StoreError::NotPermitted);
        assert_eq!(store.len(), 2);
    }
}
