//! Image editor: generated base image, annotation layer and explicit saves.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::ImageRequest;
use crate::artifacts::image::DEFAULT_IMAGE_PROMPT;
use crate::artifacts::{ArtifactKind, ImageHistoryEntry, ImageRecord};
use crate::common::errors::{StudioError, StudioResult};
use crate::common::ids::ArtifactId;
use crate::history::sanitize_file_stem;
use crate::repository::ArtifactRepository;
use crate::services::GenerationService;
use crate::session::canvas::{AnnotationLayer, Compositor, Stroke};
use crate::session::draft::{DraftState, DraftStatus};
use crate::session::notice::{Notice, Notifier};

/// Size requested for generated images and stored on new records.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// The image being edited.
pub struct ImageSession {
    repo: Arc<ArtifactRepository>,
    notifier: Arc<dyn Notifier>,
    compositor: Arc<dyn Compositor>,
    prompt: String,
    base_url: Option<String>,
    size: Option<String>,
    layer: AnnotationLayer,
    draft: DraftState,
}

impl ImageSession {
    /// Empty editor.
    #[must_use]
    pub fn new(
        repo: Arc<ArtifactRepository>,
        notifier: Arc<dyn Notifier>,
        compositor: Arc<dyn Compositor>,
    ) -> Self {
        Self {
            repo,
            notifier,
            compositor,
            prompt: String::new(),
            base_url: None,
            size: None,
            layer: AnnotationLayer::new(),
            draft: DraftState::new(),
        }
    }

    /// Prompt used for the next generation.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replace the prompt. Does not dirty the draft.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Untouched base image.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Annotations drawn over the base image.
    #[must_use]
    pub const fn layer(&self) -> &AnnotationLayer {
        &self.layer
    }

    /// Save state of the editor.
    #[must_use]
    pub const fn status(&self) -> DraftStatus {
        self.draft.status()
    }

    /// Saved image this editor writes to.
    #[must_use]
    pub const fn editing_id(&self) -> Option<ArtifactId> {
        self.draft.bound()
    }

    /// Generate a new base image for `prompt`. Annotations are cleared; the
    /// record being edited, if any, stays bound.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for a blank prompt or the service error.
    /// The current image is kept when generation fails.
    pub async fn generate(
        &mut self,
        service: &dyn GenerationService,
        prompt: &str,
    ) -> StudioResult<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.notifier.notify(Notice::error("Enter a description"));
            return Err(StudioError::InvalidOperation("prompt is empty".to_string()));
        }

        let reply = service
            .generate_image(ImageRequest {
                prompt: prompt.to_string(),
                size: Some(DEFAULT_IMAGE_SIZE.to_string()),
                quality: Some("standard".to_string()),
            })
            .await
            .inspect_err(|err| {
                warn!(error = %err, "image generation failed");
                self.notifier.notify(Notice::error("Image generation failed"));
            })?;

        self.prompt = prompt.to_string();
        self.base_url = Some(reply.image_url.clone());
        self.layer.clear();
        self.draft.mark_dirty();
        self.notifier.notify(Notice::success("Image generated"));
        Ok(reply.image_url)
    }

    /// Open a saved image: its original as the base, its annotations on top.
    pub fn load(&mut self, record: ImageRecord) {
        debug!(id = %record.id, "loading image for edit");
        self.base_url = Some(record.editable_base().to_string());
        self.layer = AnnotationLayer::from_canvas_data(record.canvas_data.as_deref());
        self.prompt = record.prompt;
        self.size = record.size;
        self.draft.load(record.id);
        self.notifier.notify(Notice::success("Image loaded, you can edit it"));
    }

    /// Add a stroke.
    pub fn draw(&mut self, stroke: Stroke) {
        self.layer.draw(stroke);
        self.draft.mark_dirty();
    }

    /// Undo the last stroke. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        let changed = self.layer.undo();
        if changed {
            self.draft.mark_dirty();
        }
        changed
    }

    /// Redo the last undone stroke.
    pub fn redo(&mut self) -> bool {
        let changed = self.layer.redo();
        if changed {
            self.draft.mark_dirty();
        }
        changed
    }

    /// Erase all annotations, keeping the base image.
    pub fn clear_canvas(&mut self) {
        self.layer.clear();
        self.draft.mark_dirty();
    }

    /// Drop the image and prompt. The editor stays bound to the record it
    /// was editing.
    pub fn clear(&mut self) {
        self.base_url = None;
        self.prompt.clear();
        self.layer.clear();
        self.notifier.notify(Notice::success("Canvas cleared"));
    }

    /// Flatten and store the image. Updates the bound record, or creates one
    /// and binds to it.
    ///
    /// # Errors
    /// Returns `InvalidOperation` without an image, `NotFound` when the bound
    /// record was deleted meanwhile, or the storage error.
    pub fn save(&mut self) -> StudioResult<ImageRecord> {
        let result = self.try_save();
        match &result {
            Ok(record) => {
                self.draft.mark_clean(record.id);
                self.notifier.notify(Notice::success("Image saved"));
            }
            Err(err) => {
                warn!(error = %err, "image save failed");
                self.notifier.notify(Notice::error(match err {
                    StudioError::NotFound { .. } => "Image not found".to_string(),
                    StudioError::InvalidOperation(_) => "No image to save".to_string(),
                    other => format!("Could not save image: {other}"),
                }));
            }
        }
        result
    }

    fn try_save(&self) -> StudioResult<ImageRecord> {
        let Some(base) = self.base_url.as_deref() else {
            return Err(StudioError::InvalidOperation("no image to save".to_string()));
        };
        let canvas_data = self.layer.to_canvas_data()?;
        let url = self.compositor.composite(base, canvas_data.as_deref())?;
        let prompt = if self.prompt.trim().is_empty() {
            DEFAULT_IMAGE_PROMPT.to_string()
        } else {
            self.prompt.clone()
        };
        let now = self.repo.clock().now_millis();

        match self.draft.bound() {
            Some(id) => {
                let existing = self
                    .repo
                    .images()
                    .find_by_id(id)
                    .ok_or(StudioError::NotFound {
                        kind: ArtifactKind::Image,
                        id,
                    })?;
                self.repo.images().update_existing(ImageRecord {
                    id,
                    url,
                    original_url: base.to_string(),
                    canvas_data,
                    prompt,
                    timestamp: now,
                    size: existing.size,
                })
            }
            None => self.repo.images().upsert(ImageRecord {
                id: self.repo.next_id(),
                url,
                original_url: base.to_string(),
                canvas_data,
                prompt,
                timestamp: now,
                size: Some(
                    self.size
                        .clone()
                        .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
                ),
            }),
        }
    }

    /// Log a download of the current image in the image history.
    ///
    /// # Errors
    /// Returns an error if there is no image or the log cannot be written.
    pub fn record_download(&self) -> StudioResult<ImageHistoryEntry> {
        let Some(base) = self.base_url.as_deref() else {
            return Err(StudioError::InvalidOperation("no image to download".to_string()));
        };
        let entry = ImageHistoryEntry::new(
            self.repo.next_id(),
            self.prompt.clone(),
            base,
            self.repo.clock().now(),
        );
        self.repo
            .image_history()
            .prepend(entry.clone())
            .inspect_err(|err| warn!(error = %err, "could not record image download"))?;
        Ok(entry)
    }

    /// File name for downloading the edited image.
    #[must_use]
    pub fn download_file_name(&self) -> String {
        format!(
            "ai-studio-edited-{}-{}.png",
            sanitize_file_stem(&self.prompt),
            self.repo.clock().now_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::clock::ManualClock;
    use crate::common::config::RetentionConfig;
    use crate::session::canvas::{DataUrlCompositor, Point};
    use crate::session::notice::NoticeLog;
    use crate::session::test_support::StubService;
    use crate::storage::MemoryLocalStore;

    fn repo() -> Arc<ArtifactRepository> {
        Arc::new(ArtifactRepository::new(
            Arc::new(MemoryLocalStore::new()),
            &RetentionConfig::default(),
            Arc::new(ManualClock::new(1_000)),
        ))
    }

    fn editor(repo: &Arc<ArtifactRepository>) -> (ImageSession, Arc<NoticeLog>) {
        let log = Arc::new(NoticeLog::new());
        let session = ImageSession::new(Arc::clone(repo), log.clone(), Arc::new(DataUrlCompositor));
        (session, log)
    }

    fn stroke() -> Stroke {
        Stroke::brush("#00ff00", 3.0, vec![Point { x: 0.0, y: 0.0 }, Point { x: 5.0, y: 5.0 }])
    }

    #[tokio::test]
    async fn test_generate_draw_save_creates_then_updates() {
        let repo = repo();
        let (mut image, _) = editor(&repo);
        image.generate(&StubService::default(), "red fox").await.unwrap();
        image.draw(stroke());

        let created = image.save().unwrap();
        assert_eq!(image.editing_id(), Some(created.id));
        assert_eq!(created.original_url, "https://images.test/red-fox.png");
        assert!(created.canvas_data.is_some());
        assert_ne!(created.url, created.original_url);
        assert_eq!(created.size.as_deref(), Some(DEFAULT_IMAGE_SIZE));

        image.draw(stroke());
        let updated = image.save().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(repo.images().list().len(), 1);
        assert_ne!(updated.canvas_data, created.canvas_data);
    }

    #[tokio::test]
    async fn test_open_then_save_reproduces_composite() {
        let repo = repo();
        let (mut first, _) = editor(&repo);
        first.generate(&StubService::default(), "lake").await.unwrap();
        first.draw(stroke());
        let saved = first.save().unwrap();

        let (mut second, _) = editor(&repo);
        second.load(saved.clone());
        assert_eq!(second.base_url(), Some(saved.original_url.as_str()));
        let resaved = second.save().unwrap();

        assert_eq!(resaved.url, saved.url);
        assert_eq!(resaved.canvas_data, saved.canvas_data);
        assert_eq!(resaved.original_url, saved.original_url);
    }

    #[test]
    fn test_legacy_png_canvas_data_survives_resave() {
        let repo = repo();
        let legacy = ImageRecord {
            id: ArtifactId::from_millis(1),
            url: "data:image/png;base64,ZmxhdA==".to_string(),
            original_url: "https://img/base.png".to_string(),
            canvas_data: Some("data:image/png;base64,c3Ryb2tlcw==".to_string()),
            prompt: "old".to_string(),
            timestamp: 1,
            size: Some("1024x1024".to_string()),
        };
        repo.images().upsert(legacy.clone()).unwrap();

        let (mut image, _) = editor(&repo);
        image.load(legacy.clone());
        let resaved = image.save().unwrap();
        assert_eq!(resaved.canvas_data, legacy.canvas_data);
        assert_eq!(resaved.size, legacy.size);
    }

    #[test]
    fn test_save_without_image_is_rejected() {
        let repo = repo();
        let (mut image, log) = editor(&repo);
        assert!(matches!(image.save(), Err(StudioError::InvalidOperation(_))));
        assert!(log.has_error());
        assert!(repo.images().list().is_empty());
    }

    #[test]
    fn test_save_after_delete_reports_not_found() {
        let repo = repo();
        let record = ImageRecord {
            id: ArtifactId::from_millis(5),
            url: "https://img/a.png".to_string(),
            original_url: "https://img/a.png".to_string(),
            canvas_data: None,
            prompt: "a".to_string(),
            timestamp: 5,
            size: None,
        };
        repo.images().upsert(record.clone()).unwrap();
        let (mut image, _) = editor(&repo);
        image.load(record.clone());
        repo.images().remove(record.id).unwrap();

        assert!(matches!(image.save(), Err(StudioError::NotFound { .. })));
        assert!(repo.images().list().is_empty());
    }

    #[tokio::test]
    async fn test_generate_keeps_binding_and_clears_strokes() {
        let repo = repo();
        let (mut image, _) = editor(&repo);
        image.generate(&StubService::default(), "one").await.unwrap();
        image.draw(stroke());
        let saved = image.save().unwrap();

        image.generate(&StubService::default(), "two").await.unwrap();
        assert!(image.layer().is_blank());
        assert_eq!(image.editing_id(), Some(saved.id));
        assert!(image.generate(&StubService::failing(), "three").await.is_err());
        assert_eq!(image.base_url(), Some("https://images.test/two.png"));
    }

    #[tokio::test]
    async fn test_record_download_and_file_name() {
        let repo = repo();
        let (mut image, _) = editor(&repo);
        assert!(image.record_download().is_err());
        image.generate(&StubService::default(), "sunset over the bay!").await.unwrap();

        let entry = image.record_download().unwrap();
        assert_eq!(repo.image_history().list(), vec![entry]);
        assert_eq!(
            image.download_file_name(),
            "ai-studio-edited-sunset-over-the-bay--1000.png"
        );
    }

    #[test]
    fn test_undo_redo_mark_dirty() {
        let repo = repo();
        let (mut image, _) = editor(&repo);
        assert!(!image.undo());
        image.draw(stroke());
        assert!(image.undo());
        assert!(image.redo());
        assert_eq!(image.status(), DraftStatus::Dirty);
        image.clear_canvas();
        assert!(image.layer().is_blank());
    }
}
