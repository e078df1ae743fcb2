//! SQLite-backed preference storage and the swallowing wrapper around it.
//!
//! # Responsibility
//! - Persist the admin-mode flag in a small key/value table.
//! - Map every storage failure to the in-memory default at the call site.

use crate::identity::context::EditAuthority;
use crate::prefs::{PrefError, PrefResult};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

const ADMIN_MODE_KEY: &str = "admin_mode";

const PREFS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

/// Contract for the local preference storage backend.
pub trait PreferenceStore {
    /// Reads the persisted admin-mode flag; `None` when never written.
    fn load_admin_mode(&self) -> PrefResult<Option<bool>>;

    /// Persists the admin-mode flag.
    fn store_admin_mode(&self, enabled: bool) -> PrefResult<()>;
}

/// Key/value preference storage in a local SQLite file.
pub struct SqlitePreferenceStore {
    conn: Connection,
}

impl SqlitePreferenceStore {
    /// Opens (or creates) the preference database at `path`.
    pub fn open(path: impl AsRef<Path>) -> PrefResult<Self> {
        Self::bootstrap(Connection::open(path)?)
    }

    /// Opens a throwaway in-memory preference database.
    pub fn open_in_memory() -> PrefResult<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> PrefResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(PREFS_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn load_admin_mode(&self) -> PrefResult<Option<bool>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![ADMIN_MODE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match value.as_deref() {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(other) => Err(PrefError::InvalidValue {
                key: ADMIN_MODE_KEY,
                value: other.to_string(),
            }),
        }
    }

    fn store_admin_mode(&self, enabled: bool) -> PrefResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![ADMIN_MODE_KEY, if enabled { "true" } else { "false" }],
        )?;
        Ok(())
    }
}

/// Admin-mode toggle with swallowed storage failures.
///
/// Read once at startup, written through on change. A missing or broken
/// backend degrades to the in-memory default `false`; nothing here can fail
/// the caller.
pub struct AdminModePreference {
    store: Option<Box<dyn PreferenceStore>>,
    enabled: bool,
}

impl AdminModePreference {
    /// Purely in-memory toggle, default off.
    pub fn in_memory() -> Self {
        Self {
            store: None,
            enabled: false,
        }
    }

    /// Loads the persisted flag, falling back to `false` on any failure.
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let enabled = match store.load_admin_mode() {
            Ok(Some(enabled)) => enabled,
            Ok(None) => false,
            Err(err) => {
                warn!("event=pref_load module=prefs status=error fallback=false error={err}");
                false
            }
        };
        Self {
            store: Some(store),
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Flips the toggle and best-effort persists it.
    pub fn set(&mut self, enabled: bool) {
        self.enabled = enabled;
        info!("event=pref_set module=prefs key=admin_mode value={enabled}");
        if let Some(store) = &self.store {
            if let Err(err) = store.store_admin_mode(enabled) {
                warn!("event=pref_store module=prefs status=error error={err}");
            }
        }
    }
}

impl EditAuthority for AdminModePreference {
    fn edit_allowed(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::{AdminModePreference, PreferenceStore, SqlitePreferenceStore};
    use crate::prefs::{PrefError, PrefResult};

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn load_admin_mode(&self) -> PrefResult<Option<bool>> {
            Err(PrefError::InvalidValue {
                key: "admin_mode",
                value: "maybe".to_string(),
            })
        }

        fn store_admin_mode(&self, _: bool) -> PrefResult<()> {
            Err(PrefError::InvalidValue {
                key: "admin_mode",
                value: "unwritable".to_string(),
            })
        }
    }

    #[test]
    fn unwritten_store_reads_back_none() {
        let store = SqlitePreferenceStore::open_in_memory().expect("open succeeds");
        assert_eq!(store.load_admin_mode().expect("load succeeds"), None);
    }

    #[test]
    fn flag_round_trips_through_sqlite() {
        let store = SqlitePreferenceStore::open_in_memory().expect("open succeeds");
        store.store_admin_mode(true).expect("store succeeds");
        assert_eq!(store.load_admin_mode().expect("load succeeds"), Some(true));
        store.store_admin_mode(false).expect("store succeeds");
        assert_eq!(store.load_admin_mode().expect("load succeeds"), Some(false));
    }

    #[test]
    fn broken_backend_degrades_to_default_false() {
        let pref = AdminModePreference::load(Box::new(BrokenStore));
        assert!(!pref.enabled());
    }

    #[test]
    fn set_survives_a_failing_write() {
        let mut pref = AdminModePreference::load(Box::new(BrokenStore));
        pref.set(true);
        assert!(pref.enabled());
    }
}
