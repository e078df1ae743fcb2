//! Portal record model.
//!
//! # Responsibility
//! - Define the canonical record shared by the announcements feed and the
//!   event calendar.
//! - Validate the field shapes the document-store collaborator hands us.
//!
//! # Invariants
//! - `id` is stable and never reused for another record in a collection.
//! - Calendar dates are fixed-width ISO `YYYY-MM-DD`, so lexicographic order
//!   equals chronological order.
//! - `date` and `location` are meaningful only for calendar events.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a portal record.
///
/// Ids are opaque strings assigned by the document-store collaborator;
/// locally created records get a generated UUID string.
pub type RecordId = String;

/// Fixed-width ISO date shape. Both bounds matter: lexicographic ordering of
/// date strings is only chronological when every date has this exact width.
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Entry in the announcements feed; display order is insertion order.
    Announcement,
    /// Entry in the event calendar; ordered by date at render time.
    CalendarEvent,
}

/// Canonical portal record for announcement and calendar-event data.
///
/// One shape serves both collections; the calendar-only fields stay `None`
/// for announcements so the document-store schema needs no second document
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable id, unique within its collection.
    pub id: RecordId,
    /// Collection discriminator, serialized as `kind`.
    pub kind: RecordKind,
    /// Headline shown in feed and calendar cells.
    pub title: String,
    /// Announcement body or event description.
    pub body: String,
    /// ISO `YYYY-MM-DD` day the event takes place. Calendar events only.
    pub date: Option<String>,
    /// Free-form venue text. Calendar events only.
    pub location: Option<String>,
}

impl Record {
    /// Creates a new announcement with a generated stable id.
    pub fn announcement(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: RecordKind::Announcement,
            title: title.into(),
            body: body.into(),
            date: None,
            location: None,
        }
    }

    /// Creates a new calendar event with a generated stable id.
    pub fn calendar_event(
        title: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: RecordKind::CalendarEvent,
            title: title.into(),
            body: description.into(),
            date: Some(date.into()),
            location: None,
        }
    }

    /// Creates a record with a caller-provided stable id.
    ///
    /// Used when the document-store collaborator already assigned identity.
    pub fn with_id(id: impl Into<RecordId>, kind: RecordKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            body: String::new(),
            date: None,
            location: None,
        }
    }

    /// Checks the field shapes required before a record enters a collection.
    ///
    /// # Errors
    /// - Empty `id` or `title`.
    /// - `date`/`location` present on an announcement.
    /// - `date` not fixed-width ISO or not a real calendar day.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.trim().is_empty() {
            return Err(RecordValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(RecordValidationError::EmptyTitle(self.id.clone()));
        }
        if self.kind == RecordKind::Announcement {
            if self.date.is_some() {
                return Err(RecordValidationError::FieldNotApplicable {
                    id: self.id.clone(),
                    field: "date",
                });
            }
            if self.location.is_some() {
                return Err(RecordValidationError::FieldNotApplicable {
                    id: self.id.clone(),
                    field: "location",
                });
            }
        }
        if let Some(date) = self.date.as_deref() {
            parse_iso_day(date).ok_or_else(|| RecordValidationError::InvalidDate {
                id: self.id.clone(),
                date: date.to_string(),
            })?;
        }
        Ok(())
    }

    /// Returns the event day parsed to calendar granularity.
    ///
    /// `None` for announcements, dateless events and unparseable dates;
    /// callers treat those records as outside any date window.
    pub fn event_day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_iso_day)
    }
}

/// Parses a fixed-width ISO `YYYY-MM-DD` string to a calendar day.
pub fn parse_iso_day(value: &str) -> Option<NaiveDate> {
    if !ISO_DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).ok()
}

/// Record shape violations rejected before a collection mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    EmptyId,
    EmptyTitle(RecordId),
    FieldNotApplicable { id: RecordId, field: &'static str },
    InvalidDate { id: RecordId, date: String },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "record id must not be empty"),
            Self::EmptyTitle(id) => write!(f, "record title must not be empty: {id}"),
            Self::FieldNotApplicable { id, field } => {
                write!(f, "field `{field}` is not applicable to announcement {id}")
            }
            Self::InvalidDate { id, date } => {
                write!(f, "record {id} has invalid ISO date `{date}`")
            }
        }
    }
}

impl Error for RecordValidationError {}

#[cfg(test)]
mod tests {
    use super::{parse_iso_day, Record, RecordKind, RecordValidationError};

    #[test]
    fn announcement_constructor_yields_valid_record() {
        let record = Record::announcement("Welcome", "Conference starts next week.");
        record.validate().expect("fresh announcement validates");
        assert_eq!(record.kind, RecordKind::Announcement);
        assert!(!record.id.is_empty());
        assert!(record.date.is_none());
    }

    #[test]
    fn calendar_event_keeps_day_granularity() {
        let record = Record::calendar_event("Opening Keynote", "State of security.", "2025-01-02");
        record.validate().expect("fresh event validates");
        let day = record.event_day().expect("event day parses");
        assert_eq!(day.to_string(), "2025-01-02");
    }

    #[test]
    fn rejects_date_on_announcement() {
        let mut record = Record::announcement("Welcome", "body");
        record.date = Some("2025-01-02".to_string());
        let err = record.validate().expect_err("announcement date must fail");
        assert!(matches!(
            err,
            RecordValidationError::FieldNotApplicable { field: "date", .. }
        ));
    }

    #[test]
    fn rejects_non_fixed_width_dates() {
        // `2025-1-2` would sort before `2024-12-31` lexicographically.
        assert!(parse_iso_day("2025-1-2").is_none());
        assert!(parse_iso_day("20250102").is_none());
        assert!(parse_iso_day("2025-01-02T10:00").is_none());
        assert!(parse_iso_day("2025-02-30").is_none());
        assert!(parse_iso_day("2025-01-02").is_some());
    }

    #[test]
    fn rejects_empty_title() {
        let mut record = Record::announcement("Welcome", "body");
        record.title = "   ".to_string();
        let err = record.validate().expect_err("blank title must fail");
        assert!(matches!(err, RecordValidationError::EmptyTitle(_)));
    }
}
