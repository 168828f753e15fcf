//! SQLite-backed entry store.
//!
//! Entries are rows in a single table:
//!
//! ```sql
//! CREATE TABLE entries (key TEXT PRIMARY KEY, salt BLOB NOT NULL, value BLOB NOT NULL)
//! ```
//!
//! Durability and locking come from SQLite itself. The connection handle
//! is owned by one backend instance and guarded by a mutex, so the backend
//! is `Send + Sync` without handing the same connection to two operations
//! at once.

use crate::backend::EntryStore;
use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vaultmap_crypto::Salt;

/// Options for opening a [`SqliteBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteOptions {
    /// Trades durability-on-crash for throughput: write-ahead-logging
    /// journal mode with relaxed synchronous commits. Off by default;
    /// never enable it where every confirmed write must survive a power
    /// failure.
    pub fast: bool,
}

impl SqliteOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets fast mode.
    #[must_use]
    pub const fn fast(mut self, value: bool) -> Self {
        self.fast = value;
        self
    }
}

/// A backend that persists entries as rows in an embedded SQLite table.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteBackend {
    /// Opens or creates the database file and its entry table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the table
    /// cannot be created.
    pub fn open(path: impl Into<PathBuf>, options: SqliteOptions) -> CoreResult<Self> {
        let path = path.into();
        let conn = Connection::open(&path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS entries (
                key   TEXT PRIMARY KEY,
                salt  BLOB NOT NULL,
                value BLOB NOT NULL
            )",
        )?;

        if options.fast {
            // journal_mode reports the resulting mode as a row.
            let _mode: String =
                conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "cache_size", -64_000)?;
            info!(path = %path.display(), "opened database in fast mode (WAL, relaxed sync)");
        }

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Returns the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reclaims space from deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the VACUUM statement fails.
    pub fn vacuum(&self) -> CoreResult<()> {
        self.conn.lock().execute_batch("VACUUM")?;
        Ok(())
    }
}

impl EntryStore for SqliteBackend {
    fn put(&mut self, key: &str, salt: &Salt, ciphertext: &[u8]) -> CoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO entries (key, salt, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET salt = excluded.salt, value = excluded.value",
            params![key, &salt.as_bytes()[..], ciphertext],
        )?;
        debug!(key, "wrote entry");
        Ok(())
    }

    fn get(&self, key: &str) -> CoreResult<(Salt, Vec<u8>)> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT salt, value FROM entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?)),
            )
            .optional()?;

        match row {
            Some((salt_bytes, ciphertext)) => {
                let salt = Salt::from_bytes(&salt_bytes)
                    .map_err(|e| CoreError::corrupted(format!("row for key {key}: {e}")))?;
                Ok((salt, ciphertext))
            }
            None => Err(CoreError::key_not_found(key)),
        }
    }

    fn delete(&mut self, key: &str) -> CoreResult<()> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
        if affected == 0 {
            return Err(CoreError::key_not_found(key));
        }
        debug!(key, "deleted entry");
        Ok(())
    }

    fn contains(&self, key: &str) -> CoreResult<bool> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                "SELECT 1 FROM entries WHERE key = ?1",
                params![key],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn keys(&self) -> CoreResult<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT key FROM entries")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }

    fn len(&self) -> CoreResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_backend(dir: &Path) -> SqliteBackend {
        SqliteBackend::open(dir.join("test.db"), SqliteOptions::default()).unwrap()
    }

    #[test]
    fn put_get_round_trip() {
        let temp = tempdir().unwrap();
        let mut backend = open_backend(temp.path());

        let salt = Salt::generate();
        backend.put("alpha", &salt, b"ciphertext bytes").unwrap();

        let (stored_salt, stored) = backend.get("alpha").unwrap();
        assert_eq!(stored_salt, salt);
        assert_eq!(stored, b"ciphertext bytes");
    }

    #[test]
    fn upsert_replaces_row() {
        let temp = tempdir().unwrap();
        let mut backend = open_backend(temp.path());

        backend.put("k", &Salt::generate(), b"v1").unwrap();
        backend.put("k", &Salt::generate(), b"v2").unwrap();

        assert_eq!(backend.len().unwrap(), 1);
        let (_, stored) = backend.get("k").unwrap();
        assert_eq!(stored, b"v2");
    }

    #[test]
    fn missing_key_is_not_found() {
        let temp = tempdir().unwrap();
        let mut backend = open_backend(temp.path());

        assert!(matches!(
            backend.get("missing"),
            Err(CoreError::KeyNotFound { .. })
        ));
        assert!(matches!(
            backend.delete("missing"),
            Err(CoreError::KeyNotFound { .. })
        ));
        assert!(!backend.contains("missing").unwrap());
    }

    #[test]
    fn delete_removes_row() {
        let temp = tempdir().unwrap();
        let mut backend = open_backend(temp.path());

        backend.put("k", &Salt::generate(), b"v").unwrap();
        backend.delete("k").unwrap();

        assert_eq!(backend.len().unwrap(), 0);
        assert!(!backend.contains("k").unwrap());
    }

    #[test]
    fn keys_lists_all_rows() {
        let temp = tempdir().unwrap();
        let mut backend = open_backend(temp.path());

        backend.put("a", &Salt::generate(), b"1").unwrap();
        backend.put("b", &Salt::generate(), b"2").unwrap();
        backend.put("c", &Salt::generate(), b"3").unwrap();

        let mut keys = backend.keys().unwrap();
        keys.sort();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn persistence_across_reopen() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("test.db");

        let salt = Salt::generate();
        {
            let mut backend =
                SqliteBackend::open(&db_path, SqliteOptions::default()).unwrap();
            backend.put("k", &salt, b"survives").unwrap();
        }

        let backend = SqliteBackend::open(&db_path, SqliteOptions::default()).unwrap();
        let (stored_salt, stored) = backend.get("k").unwrap();
        assert_eq!(stored_salt, salt);
        assert_eq!(stored, b"survives");
    }

    #[test]
    fn fast_mode_opens_and_works() {
        let temp = tempdir().unwrap();
        let mut backend =
            SqliteBackend::open(temp.path().join("fast.db"), SqliteOptions::new().fast(true))
                .unwrap();

        backend.put("k", &Salt::generate(), b"v").unwrap();
        let (_, stored) = backend.get("k").unwrap();
        assert_eq!(stored, b"v");
    }

    #[test]
    fn malformed_salt_surfaces_as_corrupted() {
        let temp = tempdir().unwrap();
        let backend = open_backend(temp.path());

        backend
            .conn
            .lock()
            .execute(
                "INSERT INTO entries (key, salt, value) VALUES (?1, ?2, ?3)",
                params!["bad", &[1u8, 2, 3][..], &b"v"[..]],
            )
            .unwrap();

        assert!(matches!(
            backend.get("bad"),
            Err(CoreError::Corrupted { .. })
        ));
    }

    #[test]
    fn vacuum_succeeds() {
        let temp = tempdir().unwrap();
        let mut backend = open_backend(temp.path());

        backend.put("k", &Salt::generate(), b"v").unwrap();
        backend.delete("k").unwrap();
        backend.vacuum().unwrap();
    }
}
