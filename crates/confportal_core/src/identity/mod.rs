//! Identity resolution and privilege gating.
//!
//! # Responsibility
//! - Define the contracts of the external identity and role-store
//!   collaborators.
//! - Resolve identity changes into a privilege state, fail-closed.
//! - Own the single mutable privilege state every gated view reads.
//!
//! # Invariants
//! - Role-lookup absence and role-lookup failure both resolve to
//!   unprivileged; there is no fail-open path.
//! - A resolution for a superseded principal never mutates state.

pub mod context;
pub mod local;
pub mod provider;
pub mod resolver;
