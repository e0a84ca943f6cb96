//! Client-side façade: one store, the repository over it, the editors and
//! the history view, wired from a [`StudioConfig`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::artifacts::{ArtifactKind, ChatMessage};
use crate::common::clock::{Clock, SystemClock};
use crate::common::config::StudioConfig;
use crate::common::errors::StudioResult;
use crate::common::ids::ArtifactId;
use crate::history::{HistoryView, RefreshPoller};
use crate::repository::ArtifactRepository;
use crate::services::{GenerationService, HttpGenerationService};
use crate::session::{DataUrlCompositor, Notifier, TracingNotifier, Workspace};
use crate::storage::{LocalStore, MemoryLocalStore, SqliteLocalStore};

/// A running studio client.
pub struct Studio {
    config: StudioConfig,
    repo: Arc<ArtifactRepository>,
    view: Arc<HistoryView>,
    service: Arc<dyn GenerationService>,
    workspace: Workspace,
}

impl Studio {
    /// Open the configured store and connect to the configured backend.
    ///
    /// Without a `SQLite` path the store is in memory and nothing survives
    /// the process; a warning is logged.
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened or the backend URL is
    /// invalid.
    pub fn open(config: StudioConfig) -> StudioResult<Self> {
        if !config.storage.is_durable() {
            warn!("no AI_STUDIO_DB_PATH set; saved artifacts live in memory and are lost on exit");
        }
        let store: Arc<dyn LocalStore> = match (&config.storage.sqlite_path, config.storage.quota_bytes) {
            (Some(path), _) => Arc::new(SqliteLocalStore::open(path)?),
            (None, Some(quota)) => Arc::new(MemoryLocalStore::with_quota(quota)),
            (None, None) => Arc::new(MemoryLocalStore::new()),
        };
        let service = Arc::new(HttpGenerationService::new(
            &config.server.backend_url,
            Duration::from_secs(config.provider.timeout_seconds),
        )?);
        Ok(Self::with_parts(
            config,
            store,
            service,
            Arc::new(TracingNotifier),
            Arc::new(SystemClock),
        ))
    }

    /// Studio over explicit parts.
    #[must_use]
    pub fn with_parts(
        config: StudioConfig,
        store: Arc<dyn LocalStore>,
        service: Arc<dyn GenerationService>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let repo = Arc::new(ArtifactRepository::new(store, &config.retention, clock));
        let view = Arc::new(HistoryView::new(Arc::clone(&repo)));
        let workspace = Workspace::new(
            &repo,
            &notifier,
            Arc::new(DataUrlCompositor),
            config.chat_identity,
        );
        view.refresh();
        info!(identity = ?config.chat_identity, "studio ready");
        Self {
            config,
            repo,
            view,
            service,
            workspace,
        }
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Shared repository.
    #[must_use]
    pub const fn repository(&self) -> &Arc<ArtifactRepository> {
        &self.repo
    }

    /// Cached history listing.
    #[must_use]
    pub const fn history(&self) -> &Arc<HistoryView> {
        &self.view
    }

    /// Editors.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Editors, mutably.
    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Start refreshing the history view in the background at the
    /// configured interval. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start_refresh(&self) -> RefreshPoller {
        RefreshPoller::start(Arc::clone(&self.view), self.config.refresh.interval())
    }

    /// Open a saved artifact in its editor.
    ///
    /// # Errors
    /// Returns `NotFound` when the artifact is gone.
    pub fn open_artifact(&mut self, kind: ArtifactKind, id: ArtifactId) -> StudioResult<()> {
        self.view.open(kind, id, &mut self.workspace)
    }

    /// Delete a saved artifact and refresh the view.
    ///
    /// # Errors
    /// Returns the storage error.
    pub fn delete_artifact(&self, kind: ArtifactKind, id: ArtifactId) -> StudioResult<bool> {
        self.view.delete(kind, id)
    }

    /// Send a chat message through the configured service.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for a blank message.
    pub async fn send_chat(&mut self, text: &str) -> StudioResult<ChatMessage> {
        let reply = self.workspace.chat.send(self.service.as_ref(), text).await?;
        self.view.refresh();
        Ok(reply)
    }

    /// Generate an image in the image editor.
    ///
    /// # Errors
    /// Returns the generation error.
    pub async fn generate_image(&mut self, prompt: &str) -> StudioResult<String> {
        self.workspace.activate(ArtifactKind::Image);
        self.workspace.image.generate(self.service.as_ref(), prompt).await
    }

    /// Generate a deck in the presentation editor.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for a blank prompt.
    pub async fn generate_presentation(
        &mut self,
        prompt: &str,
        slide_count: Option<u32>,
    ) -> StudioResult<()> {
        self.workspace.activate(ArtifactKind::Presentation);
        self.workspace
            .presentation
            .generate(self.service.as_ref(), prompt, slide_count)
            .await?;
        self.view.refresh();
        Ok(())
    }

    /// Generate a clip in the video editor.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for a blank prompt.
    pub async fn generate_video(&mut self, prompt: &str, duration: Option<u32>) -> StudioResult<()> {
        self.workspace.activate(ArtifactKind::Video);
        self.workspace
            .video
            .generate(self.service.as_ref(), prompt, duration)
            .await?;
        self.view.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::clock::ManualClock;
    use crate::session::NoticeLog;
    use crate::session::test_support::StubService;

    fn studio() -> Studio {
        Studio::with_parts(
            StudioConfig::default(),
            Arc::new(MemoryLocalStore::new()),
            Arc::new(StubService::default()),
            Arc::new(NoticeLog::new()),
            Arc::new(ManualClock::new(5_000)),
        )
    }

    #[tokio::test]
    async fn test_chat_shows_up_in_history_and_reopens() {
        let mut studio = studio();
        studio.send_chat("what is rust").await.unwrap();
        let chats = studio.history().snapshot().chats;
        assert_eq!(chats.len(), 1);

        studio.workspace_mut().chat.start_new();
        studio.open_artifact(ArtifactKind::Chat, chats[0].id).unwrap();
        assert_eq!(studio.workspace().chat.messages().len(), 2);

        assert!(studio.delete_artifact(ArtifactKind::Chat, chats[0].id).unwrap());
        assert!(studio.history().snapshot().chats.is_empty());
    }

    #[tokio::test]
    async fn test_generation_logs_refresh_view() {
        let mut studio = studio();
        studio.generate_presentation("Ownership", None).await.unwrap();
        studio.generate_video("tide", None).await.unwrap();
        studio.generate_image("fern").await.unwrap();

        let snapshot = studio.history().snapshot();
        assert_eq!(snapshot.presentation_history.len(), 1);
        assert_eq!(snapshot.video_history.len(), 1);
        assert_eq!(studio.workspace().active(), ArtifactKind::Image);
    }

    #[tokio::test]
    async fn test_open_with_sqlite_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StudioConfig::default();
        config.storage.sqlite_path = Some(dir.path().join("studio.db"));
        assert!(config.storage.is_durable());
        let studio = Studio::open(config).unwrap();
        assert!(studio.history().snapshot().chats.is_empty());
        let poller = studio.start_refresh();
        poller.stop().await;
    }
}
