//! Editable record collections.
//!
//! # Responsibility
//! - Hold the in-memory record collections behind the announcements feed and
//!   the event calendar.
//! - Manage the single-draft edit lifecycle per collection.
//!
//! # Invariants
//! - At most one draft is active per store.
//! - The committed collection is only mutated by `commit`, `insert` and
//!   `seed`; reads during an active draft return pre-edit values.

pub mod record_store;
