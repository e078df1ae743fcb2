//! Domain model for portal content and viewer privilege.
//!
//! # Responsibility
//! - Define the canonical record shape shared by the announcements feed and
//!   the event calendar.
//! - Define the privilege-state triple owned by the privilege context.
//!
//! # Invariants
//! - Every record is identified by a stable string id, unique per collection.
//! - `PrivilegeState` can never claim privilege without a signed-in principal.

pub mod identity;
pub mod record;
