//! In-process local store with an optional byte quota.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::warn;

use crate::common::errors::{StudioError, StudioResult};
use crate::storage::{ChangeFeed, LocalStore, StoreChange, StoreOp};

/// Thread-safe in-memory store.
///
/// Cloning shares the same underlying map, like two tabs sharing one
/// browser origin.
#[derive(Clone, Debug, Default)]
pub struct MemoryLocalStore {
    entries: Arc<DashMap<String, String>>,
    quota_bytes: Option<usize>,
    feed: ChangeFeed,
}

impl MemoryLocalStore {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once keys and values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum()
    }

    fn check_quota(&self, key: &str, value: &str) -> StudioResult<()> {
        let Some(limit) = self.quota_bytes else {
            return Ok(());
        };

        let others: usize = self
            .entries
            .iter()
            .filter(|entry| entry.key() != key)
            .map(|entry| entry.key().len() + entry.value().len())
            .sum();
        let needed = others + key.len() + value.len();
        if needed > limit {
            warn!(key, needed, limit, "local store quota exceeded");
            return Err(StudioError::QuotaExceeded {
                key: key.to_string(),
                needed,
                limit,
            });
        }
        Ok(())
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> StudioResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> StudioResult<()> {
        self.check_quota(key, value)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.feed.publish(key, StoreOp::Set);
        Ok(())
    }

    fn remove(&self, key: &str) -> StudioResult<()> {
        if self.entries.remove(key).is_some() {
            self.feed.publish(key, StoreOp::Remove);
        }
        Ok(())
    }

    fn keys(&self) -> StudioResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
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
    fn test_set_get_remove() {
        let store = MemoryLocalStore::new();
        assert!(store.get("chatHistory").unwrap().is_none());

        store.set("chatHistory", "[]").unwrap();
        assert_eq!(store.get("chatHistory").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.keys().unwrap(), vec!["chatHistory".to_string()]);

        store.remove("chatHistory").unwrap();
        assert!(store.get("chatHistory").unwrap().is_none());
        store.remove("chatHistory").unwrap();
    }

    #[test]
    fn test_clones_share_entries() {
        let tab_a = MemoryLocalStore::new();
        let tab_b = tab_a.clone();
        tab_a.set("savedImages", "[1]").unwrap();
        assert_eq!(tab_b.get("savedImages").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_quota_rejects_and_keeps_previous_value() {
        let store = MemoryLocalStore::with_quota(20);
        store.set("k", "small").unwrap();

        let err = store.set("k", "this value is far too large").unwrap_err();
        assert!(matches!(err, StudioError::QuotaExceeded { limit: 20, .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let store = MemoryLocalStore::with_quota(12);
        store.set("key", "123456789").unwrap();
        store.set("key", "987654321").unwrap();
        assert_eq!(store.used_bytes(), 12);
    }

    #[test]
    fn test_writes_are_announced() {
        let store = MemoryLocalStore::new();
        let mut rx = store.subscribe();

        store.set("savedVideos", "[]").unwrap();
        store.remove("savedVideos").unwrap();
        store.remove("missing").unwrap();

        assert_eq!(rx.try_recv().unwrap().op, StoreOp::Set);
        assert_eq!(rx.try_recv().unwrap().op, StoreOp::Remove);
        assert!(rx.try_recv().is_err());
    }
}
