//! Durable key/value local store holding JSON-encoded collections.
//!
//! Backends implement [`LocalStore`]; every successful write is announced on a
//! broadcast channel so views sharing the store can refresh without waiting
//! for their next poll.

pub mod memory;
pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::common::errors::StudioResult;

pub use memory::MemoryLocalStore;
pub use sqlite::SqliteLocalStore;

/// Capacity of the change-notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// String-keyed store of JSON blobs.
pub trait LocalStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> StudioResult<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the write (quota, I/O).
    fn set(&self, key: &str, value: &str) -> StudioResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> StudioResult<()>;

    /// All keys currently stored.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> StudioResult<Vec<String>>;

    /// Subscribe to write notifications.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Kind of write that happened to a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOp {
    /// Value replaced.
    Set,
    /// Key deleted.
    Remove,
}

/// Notification published after a successful write.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoreChange {
    /// Key that changed.
    pub key: String,
    /// Kind of change.
    pub op: StoreOp,
}

/// Broadcast sender shared by store backends.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<StoreChange>,
}

impl ChangeFeed {
    /// Create a feed with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Announce a change. Having no subscribers is fine.
    pub fn publish(&self, key: &str, op: StoreOp) {
        let _ = self.sender.send(StoreChange {
            key: key.to_string(),
            op,
        });
    }

    /// New receiver for future changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Well-known storage keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum StorageKey {
    /// Saved chat conversations.
    ChatHistory,
    /// Image generation log.
    ImageHistory,
    /// Video generation log.
    VideoHistory,
    /// Saved images.
    SavedImages,
    /// Saved videos.
    SavedVideos,
    /// Saved presentations.
    SavedPresentations,
    /// Presentation generation log.
    PresentationHistory,
}

impl StorageKey {
    /// Every key, in display order.
    pub const ALL: [Self; 7] = [
        Self::ChatHistory,
        Self::ImageHistory,
        Self::VideoHistory,
        Self::SavedImages,
        Self::SavedVideos,
        Self::SavedPresentations,
        Self::PresentationHistory,
    ];

    /// Key string as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatHistory => "chatHistory",
            Self::ImageHistory => "imageHistory",
            Self::VideoHistory => "videoHistory",
            Self::SavedImages => "savedImages",
            Self::SavedVideos => "savedVideos",
            Self::SavedPresentations => "savedPresentations",
            Self::PresentationHistory => "presentationHistory",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| value.to_string())
    }
}
