//! Persisted client preferences.
//!
//! # Responsibility
//! - Keep the admin-mode toggle across sessions in local client storage.
//! - Swallow every storage failure; preferences are never fatal.
//!
//! # Invariants
//! - A failed read falls back to the in-memory default `false`.
//! - The identity-derived privilege is authoritative whenever an identity
//!   provider is attached; this flag only gates offline sessions.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod store;

pub use store::{AdminModePreference, PreferenceStore, SqlitePreferenceStore};

pub type PrefResult<T> = Result<T, PrefError>;

/// Local preference-storage failures.
#[derive(Debug)]
pub enum PrefError {
    Sqlite(rusqlite::Error),
    /// A persisted value did not parse as a boolean flag.
    InvalidValue { key: &'static str, value: String },
}

impl Display for PrefError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidValue { key, value } => {
                write!(f, "preference `{key}` has invalid value `{value}`")
            }
        }
    }
}

impl Error for PrefError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for PrefError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
