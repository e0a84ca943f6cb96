//! One typed collection stored as a JSON array under a single key.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::artifacts::Record;
use crate::common::errors::{StudioError, StudioResult};
use crate::common::ids::ArtifactId;
use crate::storage::{LocalStore, StorageKey};

/// How many records a collection keeps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Retention {
    /// Keep at most this many, dropping the oldest on write.
    Capped(usize),
    /// Keep everything.
    Unbounded,
}

impl Retention {
    /// Cap from an optional limit.
    #[must_use]
    pub const fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(n) => Self::Capped(n),
            None => Self::Unbounded,
        }
    }

    fn apply<T>(self, items: &mut Vec<T>) {
        if let Self::Capped(n) = self {
            items.truncate(n);
        }
    }
}

/// Records of one type, newest first.
///
/// Every mutation reads the whole array, changes it and writes it back.
/// A blob that fails to decode reads as empty, but mutations on it are
/// refused so the stored bytes are never overwritten.
pub struct Collection<T> {
    store: Arc<dyn LocalStore>,
    key: StorageKey,
    retention: Retention,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    /// Collection under `key` of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>, key: StorageKey, retention: Retention) -> Self {
        Self {
            store,
            key,
            retention,
            _record: PhantomData,
        }
    }

    /// Storage key.
    #[must_use]
    pub const fn key(&self) -> StorageKey {
        self.key
    }

    /// Retention policy.
    #[must_use]
    pub const fn retention(&self) -> Retention {
        self.retention
    }

    /// All records, newest first. Missing or unreadable data lists as empty.
    #[must_use]
    pub fn list(&self) -> Vec<T> {
        self.try_list().unwrap_or_else(|err| {
            warn!(key = %self.key, error = %err, "treating unreadable collection as empty");
            Vec::new()
        })
    }

    /// All records, surfacing read and decode failures.
    ///
    /// # Errors
    /// Returns `CorruptCollection` if the stored JSON cannot be decoded, or
    /// the backend error if the store cannot be read.
    pub fn try_list(&self) -> StudioResult<Vec<T>> {
        let Some(raw) = self.store.get(self.key.as_str())? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StudioError::CorruptCollection {
            key: self.key.to_string(),
            source,
        })
    }

    /// Record with `id`, if stored.
    #[must_use]
    pub fn find_by_id(&self, id: ArtifactId) -> Option<T> {
        self.list().into_iter().find(|r| r.id() == id)
    }

    /// Insert `record`, or replace the record with the same id. Either way
    /// the record ends up first.
    ///
    /// # Errors
    /// Returns an error if the collection is corrupt or the write fails.
    pub fn upsert(&self, record: T) -> StudioResult<T> {
        self.upsert_by(record, |_| false)
    }

    /// Like [`Self::upsert`], but a stored record also counts as the same
    /// one when `same` returns true. The stored record's id is kept.
    ///
    /// # Errors
    /// Returns an error if the collection is corrupt or the write fails.
    pub fn upsert_by<F>(&self, mut record: T, same: F) -> StudioResult<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut items = self.try_list()?;
        let id = record.id();
        if let Some(pos) = items.iter().position(|r| r.id() == id || same(r)) {
            let existing = items.remove(pos);
            record.set_id(existing.id());
            debug!(key = %self.key, id = %existing.id(), "replacing record");
        } else {
            debug!(key = %self.key, id = %id, "inserting record");
        }
        items.insert(0, record.clone());
        self.write(items)?;
        Ok(record)
    }

    /// Replace the stored record with the same id and move it first.
    ///
    /// # Errors
    /// Returns `NotFound` if no record has that id, or an error if the
    /// collection is corrupt or the write fails.
    pub fn update_existing(&self, record: T) -> StudioResult<T> {
        let mut items = self.try_list()?;
        let id = record.id();
        let pos = items
            .iter()
            .position(|r| r.id() == id)
            .ok_or(StudioError::NotFound { kind: T::KIND, id })?;
        items.remove(pos);
        items.insert(0, record.clone());
        debug!(key = %self.key, id = %id, "updated record");
        self.write(items)?;
        Ok(record)
    }

    /// Put `record` first without looking for an existing one.
    ///
    /// # Errors
    /// Returns an error if the collection is corrupt or the write fails.
    pub fn prepend(&self, record: T) -> StudioResult<()> {
        let mut items = self.try_list()?;
        items.insert(0, record);
        self.write(items)
    }

    /// Drop the record with `id`. Returns whether one was removed; a
    /// missing id is not an error and writes nothing.
    ///
    /// # Errors
    /// Returns an error if the collection is corrupt or the write fails.
    pub fn remove(&self, id: ArtifactId) -> StudioResult<bool> {
        let mut items = self.try_list()?;
        let before = items.len();
        items.retain(|r| r.id() != id);
        if items.len() == before {
            debug!(key = %self.key, id = %id, "remove: no such record");
            return Ok(false);
        }
        self.write(items)?;
        debug!(key = %self.key, id = %id, "removed record");
        Ok(true)
    }

    /// Delete the whole collection.
    ///
    /// # Errors
    /// Returns an error if the backend write fails.
    pub fn clear(&self) -> StudioResult<()> {
        self.store.remove(self.key.as_str())
    }

    fn write(&self, mut items: Vec<T>) -> StudioResult<()> {
        self.retention.apply(&mut items);
        let raw = serde_json::to_string(&items)?;
        self.store.set(self.key.as_str(), &raw).inspect_err(|err| {
            warn!(key = %self.key, error = %err, "failed to write collection");
        })
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("key", &self.key)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}
