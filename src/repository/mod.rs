//! Artifact repository: typed collections over the local store.

pub mod collection;

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::artifacts::{
    ArtifactKind, ArtifactRecord, ChatRecord, ImageHistoryEntry, ImageRecord,
    PresentationHistoryEntry, PresentationRecord, VideoHistoryEntry, VideoRecord,
};
use crate::common::clock::Clock;
use crate::common::config::RetentionConfig;
use crate::common::errors::StudioResult;
use crate::common::ids::{ArtifactId, IdGenerator};
use crate::storage::{LocalStore, StorageKey, StoreChange};

pub use collection::{Collection, Retention};

/// Every collection of the studio, sharing one store and one id generator.
pub struct ArtifactRepository {
    store: Arc<dyn LocalStore>,
    ids: IdGenerator,
    chats: Collection<ChatRecord>,
    images: Collection<ImageRecord>,
    videos: Collection<VideoRecord>,
    presentations: Collection<PresentationRecord>,
    image_history: Collection<ImageHistoryEntry>,
    video_history: Collection<VideoHistoryEntry>,
    presentation_history: Collection<PresentationHistoryEntry>,
}

impl ArtifactRepository {
    /// Build the repository over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>, retention: &RetentionConfig, clock: Arc<dyn Clock>) -> Self {
        let chat = Retention::Capped(retention.chat_history);
        let log = Retention::Capped(retention.generation_history);
        let saved = Retention::from_limit(retention.saved);
        let shared = || Arc::clone(&store);

        info!(
            chat_cap = retention.chat_history,
            log_cap = retention.generation_history,
            "artifact repository ready"
        );

        Self {
            chats: Collection::new(shared(), StorageKey::ChatHistory, chat),
            images: Collection::new(shared(), StorageKey::SavedImages, saved),
            videos: Collection::new(shared(), StorageKey::SavedVideos, saved),
            presentations: Collection::new(shared(), StorageKey::SavedPresentations, saved),
            image_history: Collection::new(shared(), StorageKey::ImageHistory, log),
            video_history: Collection::new(shared(), StorageKey::VideoHistory, log),
            presentation_history: Collection::new(shared(), StorageKey::PresentationHistory, log),
            ids: IdGenerator::new(clock),
            store,
        }
    }

    /// Saved chat conversations.
    #[must_use]
    pub const fn chats(&self) -> &Collection<ChatRecord> {
        &self.chats
    }

    /// Saved images.
    #[must_use]
    pub const fn images(&self) -> &Collection<ImageRecord> {
        &self.images
    }

    /// Saved videos.
    #[must_use]
    pub const fn videos(&self) -> &Collection<VideoRecord> {
        &self.videos
    }

    /// Saved presentations.
    #[must_use]
    pub const fn presentations(&self) -> &Collection<PresentationRecord> {
        &self.presentations
    }

    /// Image generation log.
    #[must_use]
    pub const fn image_history(&self) -> &Collection<ImageHistoryEntry> {
        &self.image_history
    }

    /// Video generation log.
    #[must_use]
    pub const fn video_history(&self) -> &Collection<VideoHistoryEntry> {
        &self.video_history
    }

    /// Presentation generation log.
    #[must_use]
    pub const fn presentation_history(&self) -> &Collection<PresentationHistoryEntry> {
        &self.presentation_history
    }

    /// Fresh artifact id.
    #[must_use]
    pub fn next_id(&self) -> ArtifactId {
        self.ids.next_id()
    }

    /// Clock used for ids and timestamps.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.ids.clock()
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    /// Write notifications from the underlying store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe()
    }

    /// Saved artifact of `kind` with `id`.
    #[must_use]
    pub fn find(&self, kind: ArtifactKind, id: ArtifactId) -> Option<ArtifactRecord> {
        match kind {
            ArtifactKind::Chat => self.chats.find_by_id(id).map(Into::into),
            ArtifactKind::Image => self.images.find_by_id(id).map(Into::into),
            ArtifactKind::Video => self.videos.find_by_id(id).map(Into::into),
            ArtifactKind::Presentation => self.presentations.find_by_id(id).map(Into::into),
        }
    }

    /// Delete a saved artifact. Returns whether anything was removed.
    ///
    /// # Errors
    /// Returns an error if the collection is corrupt or the write fails.
    pub fn remove(&self, kind: ArtifactKind, id: ArtifactId) -> StudioResult<bool> {
        match kind {
            ArtifactKind::Chat => self.chats.remove(id),
            ArtifactKind::Image => self.images.remove(id),
            ArtifactKind::Video => self.videos.remove(id),
            ArtifactKind::Presentation => self.presentations.remove(id),
        }
    }
}

impl fmt::Debug for ArtifactRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactRepository")
            .field("chats", &self.chats)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ChatMessage;
    use crate::common::clock::ManualClock;
    use crate::storage::MemoryLocalStore;

    fn repository(store: &MemoryLocalStore) -> ArtifactRepository {
        ArtifactRepository::new(
            Arc::new(store.clone()),
            &RetentionConfig::default(),
            Arc::new(ManualClock::new(1_000)),
        )
    }

    fn chat(repo: &ArtifactRepository, text: &str) -> ChatRecord {
        let now = repo.clock().now();
        ChatRecord::snapshot(repo.next_id(), vec![ChatMessage::user(text, now)], now)
    }

    #[test]
    fn test_chat_round_trip() {
        let store = MemoryLocalStore::new();
        let repo = repository(&store);
        let record = chat(&repo, "hello");
        repo.chats().upsert(record.clone()).unwrap();
        assert_eq!(repo.chats().find_by_id(record.id), Some(record.clone()));
        assert_eq!(
            repo.find(ArtifactKind::Chat, record.id),
            Some(ArtifactRecord::Chat(record))
        );
    }

    #[test]
    fn test_fifty_chat_cap_evicts_least_recent() {
        let store = MemoryLocalStore::new();
        let repo = repository(&store);
        let mut stored = Vec::new();
        for i in 0..52 {
            let record = chat(&repo, &format!("conversation {i}"));
            stored.push(record.id);
            repo.chats().upsert(record).unwrap();
        }
        assert_eq!(repo.chats().list().len(), 50);

        for i in 0..3 {
            repo.chats().upsert(chat(&repo, &format!("new {i}"))).unwrap();
        }
        let list = repo.chats().list();
        assert_eq!(list.len(), 50);
        assert_eq!(list[0].title, "new 2");
        assert!(repo.chats().find_by_id(stored[4]).is_none());
        assert!(repo.chats().find_by_id(stored[5]).is_some());
    }

    #[test]
    fn test_collections_use_separate_keys() {
        let store = MemoryLocalStore::new();
        let repo = repository(&store);
        repo.chats().upsert(chat(&repo, "a")).unwrap();
        store.set(StorageKey::SavedImages.as_str(), "garbage").unwrap();

        assert!(repo.images().list().is_empty());
        assert_eq!(repo.chats().list().len(), 1);
        assert_eq!(repo.chats().key(), StorageKey::ChatHistory);
        assert_eq!(repo.image_history().retention(), Retention::Capped(20));
        assert_eq!(repo.presentations().retention(), Retention::Unbounded);
    }

    #[test]
    fn test_remove_by_kind() {
        let store = MemoryLocalStore::new();
        let repo = repository(&store);
        let record = chat(&repo, "bye");
        repo.chats().upsert(record.clone()).unwrap();

        assert!(!repo.remove(ArtifactKind::Image, record.id).unwrap());
        assert!(repo.remove(ArtifactKind::Chat, record.id).unwrap());
        assert!(repo.find(ArtifactKind::Chat, record.id).is_none());
    }
}
