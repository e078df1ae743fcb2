//! Render plan handed to the calendar-rendering collaborator.
//!
//! The collaborator owns the actual widget; this module only derives the
//! `{ events, visible_range, mode }` triple it consumes.

use crate::calendar::date_window::{compact_window, DateWindow};
use crate::model::record::Record;
use chrono::NaiveDate;

/// Display mode requested from the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarViewMode {
    /// Default full-month grid.
    Month,
    /// Narrowed range covering only the event days.
    CompactDays,
}

/// Visible date range, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end_exclusive: NaiveDate,
}

/// Complete input for one render pass of the calendar widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarViewPlan {
    pub mode: CalendarViewMode,
    pub visible_range: Option<DateSpan>,
    pub events: Vec<Record>,
}

/// Derives the render plan for the current calendar collection.
///
/// # Contract
/// - Compact mode: range from the [`DateWindow`], events filtered to those
///   whose day is in the window's day set. Records without a parseable day
///   cannot fall inside the window and are filtered out defensively.
/// - Month mode: no range, collection passed through unfiltered.
pub fn plan_view(records: &[Record]) -> CalendarViewPlan {
    match compact_window(records) {
        Some(window) => CalendarViewPlan {
            mode: CalendarViewMode::CompactDays,
            visible_range: Some(DateSpan {
                start: window.start(),
                end_exclusive: window.end_exclusive(),
            }),
            events: filter_to_window(records, &window),
        },
        None => CalendarViewPlan {
            mode: CalendarViewMode::Month,
            visible_range: None,
            events: records.to_vec(),
        },
    }
}

fn filter_to_window(records: &[Record], window: &DateWindow) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.event_day().is_some_and(|day| window.covers(day)))
        .cloned()
        .collect()
}
