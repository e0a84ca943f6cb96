//! `SQLite`-backed local store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::broadcast;
use tracing::info;

use crate::common::errors::StudioResult;
use crate::storage::{ChangeFeed, LocalStore, StoreChange, StoreOp};

/// Table holding one row per key.
const TABLE: &str = "local_store";

/// Durable store persisting every key as one row.
pub struct SqliteLocalStore {
    conn: Mutex<Connection>,
    feed: ChangeFeed,
}

impl SqliteLocalStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened sqlite local store");
        Self::init(conn)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> StudioResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StudioResult<Self> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {TABLE} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )"
        ))?;
        Ok(Self {
            conn: Mutex::new(conn),
            feed: ChangeFeed::new(),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocalStore for SqliteLocalStore {
    fn get(&self, key: &str) -> StudioResult<Option<String>> {
        let value = self
            .conn()
            .query_row(
                &format!("SELECT value FROM {TABLE} WHERE key = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StudioResult<()> {
        self.conn().execute(
            &format!(
                "INSERT INTO {TABLE} (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"
            ),
            params![key, value, Utc::now().timestamp_millis()],
        )?;
        self.feed.publish(key, StoreOp::Set);
        Ok(())
    }

    fn remove(&self, key: &str) -> StudioResult<()> {
        let removed = self
            .conn()
            .execute(&format!("DELETE FROM {TABLE} WHERE key = ?1"), params![key])?;
        if removed > 0 {
            self.feed.publish(key, StoreOp::Remove);
        }
        Ok(())
    }

    fn keys(&self) -> StudioResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT key FROM {TABLE} ORDER BY key"))?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let store = SqliteLocalStore::open_in_memory().unwrap();
        store.set("savedPresentations", "[]").unwrap();
        store.set("savedPresentations", "[{\"id\":1}]").unwrap();
        assert_eq!(
            store.get("savedPresentations").unwrap().as_deref(),
            Some("[{\"id\":1}]")
        );
        assert_eq!(store.keys().unwrap(), vec!["savedPresentations".to_string()]);

        store.remove("savedPresentations").unwrap();
        assert!(store.get("savedPresentations").unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.sqlite");

        {
            let store = SqliteLocalStore::open(&path).unwrap();
            store.set("chatHistory", "[]").unwrap();
        }

        let reopened = SqliteLocalStore::open(&path).unwrap();
        assert_eq!(reopened.get("chatHistory").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_remove_missing_is_silent() {
        let store = SqliteLocalStore::open_in_memory().unwrap();
        let mut rx = store.subscribe();
        store.remove("nothing").unwrap();
        assert!(rx.try_recv().is_err());
    }
}
