//! SQLite-backed key-value storage.
//!
//! Holds the three engine documents (settings, stats, current session) in a
//! single `kv` table, stamped with their last write time.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::gateway::{keys, KeyValueStore};
use super::{data_dir, migrations};
use crate::error::{CoreError, StorageError};

pub const DEFAULT_DATABASE_FILE: &str = "focustrack.db";

/// One stored key, without its value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key: String,
    pub bytes: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// SQLite database for engine state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open `<data_dir>/focustrack.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened
    /// or migrated.
    pub fn open_default() -> Result<Self, CoreError> {
        let path = data_dir()?.join(DEFAULT_DATABASE_FILE);
        Self::open(path)
    }

    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, CoreError> {
        migrations::migrate(&conn)
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// List stored keys with their size and last write time.
    pub fn kv_keys(&self) -> Result<Vec<KeyInfo>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, LENGTH(value), updated_at FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            let stamp: String = row.get(2)?;
            Ok(KeyInfo {
                key: row.get(0)?,
                bytes: row.get::<_, i64>(1)?.max(0) as u64,
                updated_at: DateTime::parse_from_rfc3339(&stamp)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            })
        })?;
        rows.collect()
    }

    /// Remove every engine document (settings, stats, current session).
    pub fn clear_all(&self) -> Result<(), rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        for key in keys::ALL {
            tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        }
        tx.commit()
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Ok(self.kv_remove(key)?)
    }
}
