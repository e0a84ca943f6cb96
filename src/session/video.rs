//! Video editor. Each save keeps a new copy of the current clip.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{VIDEO_STATUS_DEMO, VideoReply, VideoRequest};
use crate::artifacts::video::DEFAULT_VIDEO_PROMPT;
use crate::artifacts::{VideoHistoryEntry, VideoRecord};
use crate::common::errors::{StudioError, StudioResult};
use crate::repository::ArtifactRepository;
use crate::session::draft::{DraftState, DraftStatus};
use crate::session::notice::{Notice, Notifier};
use crate::services::GenerationService;

/// Clip shown when the video endpoint fails.
pub const DEMO_FALLBACK_URL: &str = "https://www.w3schools.com/html/mov_bbb.mp4";

/// Seconds requested when none is given.
pub const DEFAULT_VIDEO_DURATION: u32 = 5;

/// The current clip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentVideo {
    /// Clip URL.
    pub url: String,
    /// Prompt the clip was requested with.
    pub prompt: String,
    /// Seconds.
    pub duration: u32,
    /// Backend status, `demo` for placeholders.
    pub status: String,
}

/// Video editor: one current clip, saved on request.
pub struct VideoSession {
    repo: Arc<ArtifactRepository>,
    notifier: Arc<dyn Notifier>,
    current: Option<CurrentVideo>,
    draft: DraftState,
}

impl VideoSession {
    /// Editor with no clip.
    #[must_use]
    pub fn new(repo: Arc<ArtifactRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            current: None,
            draft: DraftState::new(),
        }
    }

    /// Clip on screen, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&CurrentVideo> {
        self.current.as_ref()
    }

    /// Save state of the current clip.
    #[must_use]
    pub const fn status(&self) -> DraftStatus {
        self.draft.status()
    }

    /// Request a clip. On failure the demo clip is shown instead and the
    /// generation log is left alone.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for a blank prompt.
    pub async fn generate(
        &mut self,
        service: &dyn GenerationService,
        prompt: &str,
        duration: Option<u32>,
    ) -> StudioResult<&CurrentVideo> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.notifier.notify(Notice::error("Enter a description"));
            return Err(StudioError::InvalidOperation("prompt is empty".to_string()));
        }
        let duration = duration.unwrap_or(DEFAULT_VIDEO_DURATION);
        let request = VideoRequest {
            prompt: prompt.to_string(),
            duration: Some(duration),
        };

        let reply = match service.generate_video(request).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "video generation failed, showing demo clip");
                self.notifier
                    .notify(Notice::error("Video generation failed, showing a demo clip"));
                VideoReply {
                    video_url: DEMO_FALLBACK_URL.to_string(),
                    prompt: prompt.to_string(),
                    duration,
                    status: VIDEO_STATUS_DEMO.to_string(),
                    message: None,
                }
            }
        };

        if reply.is_demo() {
            if let Some(message) = &reply.message {
                self.notifier.notify(Notice::info(message.clone()));
            }
        } else {
            info!(url = %reply.video_url, "video generated");
            self.log_generation(&reply, prompt);
        }

        self.draft.mark_dirty();
        Ok(self.current.insert(CurrentVideo {
            url: reply.video_url,
            prompt: prompt.to_string(),
            duration: if reply.duration == 0 {
                duration
            } else {
                reply.duration
            },
            status: reply.status,
        }))
    }

    fn log_generation(&self, reply: &VideoReply, prompt: &str) {
        let entry = VideoHistoryEntry {
            id: self.repo.next_id(),
            prompt: prompt.to_string(),
            video_url: reply.video_url.clone(),
            timestamp: self.repo.clock().now(),
            duration: reply.duration,
        };
        if let Err(err) = self.repo.video_history().prepend(entry) {
            warn!(error = %err, "could not record video generation");
        }
    }

    /// Keep the current clip as a new saved video.
    ///
    /// # Errors
    /// Returns `InvalidOperation` without a clip, or the storage error.
    pub fn save(&mut self) -> StudioResult<VideoRecord> {
        let Some(current) = &self.current else {
            self.notifier.notify(Notice::error("No video to save"));
            return Err(StudioError::InvalidOperation("no video to save".to_string()));
        };
        let prompt = if current.prompt.trim().is_empty() {
            DEFAULT_VIDEO_PROMPT.to_string()
        } else {
            current.prompt.clone()
        };
        let record = VideoRecord {
            id: self.repo.next_id(),
            url: current.url.clone(),
            prompt,
            duration: current.duration,
            timestamp: self.repo.clock().now_millis(),
        };
        match self.repo.videos().upsert(record) {
            Ok(saved) => {
                self.draft.mark_clean(saved.id);
                self.notifier.notify(Notice::success("Video saved"));
                Ok(saved)
            }
            Err(err) => {
                warn!(error = %err, "video save failed");
                self.notifier
                    .notify(Notice::error(format!("Could not save video: {err}")));
                Err(err)
            }
        }
    }

    /// Show a saved clip.
    pub fn load(&mut self, record: VideoRecord) {
        self.current = Some(CurrentVideo {
            url: record.url,
            prompt: record.prompt,
            duration: record.duration,
            status: "saved".to_string(),
        });
        self.draft.load(record.id);
    }

    /// File name for downloading the current clip.
    #[must_use]
    pub fn download_file_name(&self) -> String {
        format!("ai-studio-video-{}.mp4", self.repo.clock().now_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::clock::ManualClock;
    use crate::common::config::RetentionConfig;
    use crate::session::notice::NoticeLog;
    use crate::session::test_support::StubService;
    use crate::storage::MemoryLocalStore;

    fn setup() -> (Arc<ArtifactRepository>, VideoSession, Arc<NoticeLog>) {
        let clock = Arc::new(ManualClock::new(7_000));
        let repo = Arc::new(ArtifactRepository::new(
            Arc::new(MemoryLocalStore::new()),
            &RetentionConfig::default(),
            clock,
        ));
        let log = Arc::new(NoticeLog::new());
        let session = VideoSession::new(Arc::clone(&repo), log.clone());
        (repo, session, log)
    }

    #[tokio::test]
    async fn test_completed_video_is_logged() {
        let (repo, mut video, _) = setup();
        let current = video
            .generate(&StubService::default(), "waves", Some(8))
            .await
            .unwrap()
            .clone();
        assert_eq!(current.url, "https://videos.test/clip.mp4");
        assert_eq!(current.duration, 8);

        let history = repo.video_history().list();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].video_url, current.url);
    }

    #[tokio::test]
    async fn test_demo_video_is_not_logged() {
        let (repo, mut video, _) = setup();
        video.generate(&StubService::demo(), "waves", None).await.unwrap();
        assert!(repo.video_history().list().is_empty());
        assert_eq!(video.current().unwrap().duration, DEFAULT_VIDEO_DURATION);
    }

    #[tokio::test]
    async fn test_failure_shows_fallback_clip() {
        let (repo, mut video, log) = setup();
        let current = video
            .generate(&StubService::failing(), "waves", None)
            .await
            .unwrap()
            .clone();
        assert_eq!(current.url, DEMO_FALLBACK_URL);
        assert_eq!(current.status, VIDEO_STATUS_DEMO);
        assert!(log.has_error());
        assert!(repo.video_history().list().is_empty());
    }

    #[tokio::test]
    async fn test_each_save_inserts() {
        let (repo, mut video, _) = setup();
        assert!(video.save().is_err());
        video.generate(&StubService::default(), "  ", None).await.unwrap_err();

        video.generate(&StubService::default(), "waves", None).await.unwrap();
        let a = video.save().unwrap();
        let b = video.save().unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(repo.videos().list().len(), 2);
        assert_eq!(video.status(), DraftStatus::Clean);
        assert_eq!(video.download_file_name(), "ai-studio-video-7000.mp4");
    }
}
