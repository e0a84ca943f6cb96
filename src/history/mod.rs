//! Read path over the saved artifacts: history and saved lists.
//!
//! [`HistoryView`] caches a [`HistorySnapshot`] of every collection. The
//! cache is rebuilt by [`HistoryView::refresh`], which [`RefreshPoller`]
//! calls on a fixed interval and whenever the store reports a write, so
//! changes made by other clients of the same store show up.

pub mod download;
pub mod poller;

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::artifacts::{
    ArtifactKind, ChatRecord, ImageHistoryEntry, ImageRecord, PresentationHistoryEntry,
    PresentationRecord, VideoHistoryEntry, VideoRecord,
};
use crate::common::errors::{StudioError, StudioResult};
use crate::common::ids::ArtifactId;
use crate::repository::ArtifactRepository;
use crate::session::Workspace;
use crate::storage::StoreChange;

pub use download::{DownloadOutcome, download};
pub use poller::RefreshPoller;

/// Characters of the prompt kept in download file names.
const FILE_STEM_CHARS: usize = 30;

/// Conversations shown in the quick chat list.
pub const RECENT_CHATS: usize = 10;

/// File-name-safe stem from the start of `prompt`.
#[must_use]
pub fn sanitize_file_stem(prompt: &str) -> String {
    prompt
        .chars()
        .take(FILE_STEM_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Everything the history and saved views display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistorySnapshot {
    /// Saved conversations, most recent first.
    pub chats: Vec<ChatRecord>,
    /// Saved images.
    pub images: Vec<ImageRecord>,
    /// Saved videos.
    pub videos: Vec<VideoRecord>,
    /// Saved decks.
    pub presentations: Vec<PresentationRecord>,
    /// Image generation log.
    pub image_history: Vec<ImageHistoryEntry>,
    /// Video generation log.
    pub video_history: Vec<VideoHistoryEntry>,
    /// Deck generation log.
    pub presentation_history: Vec<PresentationHistoryEntry>,
    /// When the snapshot was taken; `None` before the first refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl HistorySnapshot {
    /// Number of saved artifacts of `kind`.
    #[must_use]
    pub fn count(&self, kind: ArtifactKind) -> usize {
        match kind {
            ArtifactKind::Chat => self.chats.len(),
            ArtifactKind::Image => self.images.len(),
            ArtifactKind::Video => self.videos.len(),
            ArtifactKind::Presentation => self.presentations.len(),
        }
    }
}

/// Cached listing of the repository.
#[derive(Debug)]
pub struct HistoryView {
    repo: Arc<ArtifactRepository>,
    snapshot: RwLock<HistorySnapshot>,
}

impl HistoryView {
    /// View with an empty cache. Call [`Self::refresh`] to fill it.
    #[must_use]
    pub fn new(repo: Arc<ArtifactRepository>) -> Self {
        Self {
            repo,
            snapshot: RwLock::new(HistorySnapshot::default()),
        }
    }

    /// Re-read every collection. Unreadable collections list as empty
    /// without touching the others.
    pub fn refresh(&self) -> HistorySnapshot {
        let snapshot = HistorySnapshot {
            chats: self.repo.chats().list(),
            images: self.repo.images().list(),
            videos: self.repo.videos().list(),
            presentations: self.repo.presentations().list(),
            image_history: self.repo.image_history().list(),
            video_history: self.repo.video_history().list(),
            presentation_history: self.repo.presentation_history().list(),
            refreshed_at: Some(self.repo.clock().now()),
        };
        debug!(
            chats = snapshot.chats.len(),
            images = snapshot.images.len(),
            videos = snapshot.videos.len(),
            presentations = snapshot.presentations.len(),
            "history refreshed"
        );
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot.clone();
        snapshot
    }

    /// Write notifications of the underlying store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.repo.subscribe()
    }

    /// Cached snapshot.
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The `n` most recent conversations from the cache.
    #[must_use]
    pub fn chats_recent(&self, n: usize) -> Vec<ChatRecord> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .chats
            .iter()
            .take(n)
            .cloned()
            .collect()
    }

    /// Window regained focus.
    pub fn on_focus(&self) {
        self.refresh();
    }

    /// Visibility changed; hidden views are left alone.
    pub fn on_visibility(&self, visible: bool) {
        if visible {
            self.refresh();
        }
    }

    /// Load a saved artifact into its editor.
    ///
    /// # Errors
    /// Returns `NotFound` when the artifact is no longer stored.
    pub fn open(
        &self,
        kind: ArtifactKind,
        id: ArtifactId,
        workspace: &mut Workspace,
    ) -> StudioResult<()> {
        let Some(record) = self.repo.find(kind, id) else {
            warn!(%kind, %id, "artifact to open is gone");
            self.refresh();
            return Err(StudioError::NotFound { kind, id });
        };
        workspace.open(record);
        Ok(())
    }

    /// Delete a saved artifact and refresh. Deleting a missing id is a
    /// no-op that still refreshes.
    ///
    /// # Errors
    /// Returns the storage error; the cache is refreshed either way.
    pub fn delete(&self, kind: ArtifactKind, id: ArtifactId) -> StudioResult<bool> {
        let result = self.repo.remove(kind, id);
        match &result {
            Ok(true) => info!(%kind, %id, "artifact deleted"),
            Ok(false) => debug!(%kind, %id, "nothing to delete"),
            Err(err) => warn!(%kind, %id, error = %err, "delete failed"),
        }
        self.refresh();
        result
    }
}
