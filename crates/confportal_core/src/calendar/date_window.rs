//! Compact date-window derivation.
//!
//! # Responsibility
//! - Reduce the calendar collection to its distinct event days.
//! - Decide whether those days fit a compact display window.
//!
//! # Invariants
//! - A window exists only for 1 to `COMPACT_WINDOW_MAX_DAYS` distinct days.
//! - `end_exclusive` is always one day past the latest event day, so a
//!   single-day input still yields a valid one-day window.

use crate::model::record::Record;
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;

/// Largest number of distinct event days a compact window may cover.
///
/// A conference's events cluster on a handful of days; beyond this the full
/// month view is the better use of screen space.
pub const COMPACT_WINDOW_MAX_DAYS: usize = 3;

/// Narrowed calendar display range covering only days that hold events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    days: Vec<NaiveDate>,
    start: NaiveDate,
    end_exclusive: NaiveDate,
}

impl DateWindow {
    /// Distinct event days, ascending.
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// First visible day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// One day past the last visible day.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end_exclusive
    }

    /// Whether `day` is one of the event days (not merely inside the span).
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.days.binary_search(&day).is_ok()
    }
}

/// Derives the compact window for a record collection.
///
/// Returns `None` when the collection has no dated records or spreads over
/// more than [`COMPACT_WINDOW_MAX_DAYS`] distinct days; the caller then
/// falls back to the default month view with the unfiltered collection.
pub fn compact_window(records: &[Record]) -> Option<DateWindow> {
    let days: BTreeSet<NaiveDate> = records.iter().filter_map(Record::event_day).collect();
    if days.is_empty() || days.len() > COMPACT_WINDOW_MAX_DAYS {
        return None;
    }

    let days: Vec<NaiveDate> = days.into_iter().collect();
    let start = *days.first()?;
    let last = *days.last()?;
    // checked_add fails only at the calendar's representable end.
    let end_exclusive = last.checked_add_days(Days::new(1))?;
    Some(DateWindow {
        days,
        start,
        end_exclusive,
    })
}
