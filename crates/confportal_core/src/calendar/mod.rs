//! Calendar view derivation.
//!
//! # Responsibility
//! - Derive the compact date window from the calendar collection.
//! - Shape the exact input the rendering collaborator consumes.

pub mod date_window;
pub mod render;
