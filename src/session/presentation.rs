//! Presentation editor: slide list, template and explicit saves.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::PresentationRequest;
use crate::artifacts::presentation::{derive_deck_title, title_slide_heading};
use crate::artifacts::{
    Deck, PresentationHistoryEntry, PresentationRecord, Slide, SlideEdit, Template,
};
use crate::common::errors::{StudioError, StudioResult};
use crate::common::ids::ArtifactId;
use crate::repository::ArtifactRepository;
use crate::services::GenerationService;
use crate::session::draft::{DraftState, DraftStatus};
use crate::session::notice::{Notice, Notifier};

/// Slide count requested when none is given.
pub const DEFAULT_SLIDE_COUNT: u32 = 5;

/// How a deck came to be in the editor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeckSource {
    /// Returned by the presentation service.
    Generated,
    /// Fixed deck substituted after a failed request.
    Fallback,
}

/// The deck being edited.
pub struct PresentationSession {
    repo: Arc<ArtifactRepository>,
    notifier: Arc<dyn Notifier>,
    prompt: String,
    title: String,
    slides: Vec<Slide>,
    template: Template,
    current: usize,
    draft: DraftState,
}

impl PresentationSession {
    /// Empty editor.
    #[must_use]
    pub fn new(repo: Arc<ArtifactRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            prompt: String::new(),
            title: String::new(),
            slides: Vec::new(),
            template: Template::default(),
            current: 0,
            draft: DraftState::new(),
        }
    }

    /// Working deck title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Working slides.
    #[must_use]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Working theme.
    #[must_use]
    pub const fn template(&self) -> Template {
        self.template
    }

    /// Index of the selected slide.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Save state of the deck.
    #[must_use]
    pub const fn status(&self) -> DraftStatus {
        self.draft.status()
    }

    /// Saved deck this editor writes to.
    #[must_use]
    pub const fn editing_id(&self) -> Option<ArtifactId> {
        self.draft.bound()
    }

    /// Generate a deck for `prompt`. A failed request installs the fallback
    /// deck; only successful generations are logged in the history.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for a blank prompt.
    pub async fn generate(
        &mut self,
        service: &dyn GenerationService,
        prompt: &str,
        slide_count: Option<u32>,
    ) -> StudioResult<DeckSource> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.notifier.notify(Notice::error("Enter a topic"));
            return Err(StudioError::InvalidOperation("prompt is empty".to_string()));
        }
        self.prompt = prompt.to_string();

        let request = PresentationRequest {
            prompt: prompt.to_string(),
            template: Some(self.template),
            number_of_slides: Some(slide_count.unwrap_or(DEFAULT_SLIDE_COUNT)),
        };
        let source = match service.generate_presentation(request).await {
            Ok(reply) => {
                let title = if reply.title.trim().is_empty() {
                    prompt.to_string()
                } else {
                    reply.title
                };
                info!(slides = reply.slides.len(), by = %reply.generated_by, "deck generated");
                self.notifier.notify(Notice::success(format!(
                    "{} slides generated with {}",
                    reply.slides.len(),
                    reply.generated_by
                )));
                self.install(title, reply.slides);
                self.log_generation();
                DeckSource::Generated
            }
            Err(err) => {
                warn!(error = %err, "presentation generation failed, using fallback deck");
                self.notifier.notify(Notice::error("Presentation generation failed"));
                let deck = Deck::fallback(prompt);
                self.install(deck.title, deck.slides);
                DeckSource::Fallback
            }
        };
        Ok(source)
    }

    fn install(&mut self, title: String, slides: Vec<Slide>) {
        self.title = title;
        self.slides = slides;
        self.current = 0;
        self.sync_title();
        self.draft.mark_dirty();
    }

    fn log_generation(&self) {
        let entry = PresentationHistoryEntry {
            id: self.repo.next_id(),
            title: self.title.clone(),
            slides: self.slides.clone(),
            template: self.template,
            created_at: self.repo.clock().now(),
        };
        if let Err(err) = self.repo.presentation_history().prepend(entry) {
            warn!(error = %err, "could not record presentation generation");
        }
    }

    fn sync_title(&mut self) {
        if let Some(heading) = title_slide_heading(&self.slides) {
            self.title = heading.to_string();
        }
    }

    /// Open a saved deck.
    pub fn load(&mut self, record: PresentationRecord) {
        debug!(id = %record.id, slides = record.slides.len(), "loading presentation");
        self.title = record.title;
        self.slides = record.slides;
        self.template = record.template;
        self.current = 0;
        self.sync_title();
        self.draft.load(record.id);
        self.notifier.notify(Notice::success("Presentation loaded"));
    }

    /// Append a content slide and select it.
    pub fn add_slide(&mut self) -> usize {
        self.slides.push(Slide::content(
            "New Slide",
            "Slide content",
            ["Point 1", "Point 2", "Point 3"],
        ));
        self.current = self.slides.len() - 1;
        self.draft.mark_dirty();
        self.current
    }

    /// Remove slide `index`. The last remaining slide cannot be removed.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for the only slide or an invalid index.
    pub fn delete_slide(&mut self, index: usize) -> StudioResult<()> {
        if self.slides.len() <= 1 {
            self.notifier.notify(Notice::error("You cannot delete the only slide"));
            return Err(StudioError::InvalidOperation(
                "cannot delete the only slide".to_string(),
            ));
        }
        if index >= self.slides.len() {
            return Err(StudioError::InvalidOperation(format!(
                "slide {index} does not exist"
            )));
        }
        self.slides.remove(index);
        if self.current >= self.slides.len() {
            self.current = self.slides.len() - 1;
        }
        self.sync_title();
        self.draft.mark_dirty();
        Ok(())
    }

    /// Edit one field of slide `index`.
    ///
    /// # Errors
    /// Returns `InvalidOperation` for an invalid index or field.
    pub fn update_slide(&mut self, index: usize, edit: SlideEdit) -> StudioResult<()> {
        let slide = self.slides.get_mut(index).ok_or_else(|| {
            StudioError::InvalidOperation(format!("slide {index} does not exist"))
        })?;
        slide.apply(edit)?;
        // Editing the title slide's heading renames the deck, even to blank.
        if index == 0 && slide.is_title() {
            self.title = slide.heading().to_string();
        }
        self.draft.mark_dirty();
        Ok(())
    }

    /// Switch theme. Marks the draft dirty when it changes.
    pub fn set_template(&mut self, template: Template) {
        if self.template != template {
            self.template = template;
            self.draft.mark_dirty();
        }
    }

    /// Select slide `index`, clamped to the deck.
    pub fn select_slide(&mut self, index: usize) -> usize {
        self.current = index.min(self.slides.len().saturating_sub(1));
        self.current
    }

    /// Store the deck. Updates the bound record, or creates one and binds.
    ///
    /// # Errors
    /// Returns `InvalidOperation` without slides, `NotFound` when the bound
    /// record was deleted meanwhile, or the storage error.
    pub fn save(&mut self) -> StudioResult<PresentationRecord> {
        let result = self.try_save();
        match &result {
            Ok(record) => {
                self.draft.mark_clean(record.id);
                self.notifier.notify(Notice::success("Presentation saved"));
            }
            Err(err) => {
                warn!(error = %err, "presentation save failed");
                self.notifier.notify(Notice::error(match err {
                    StudioError::NotFound { .. } => "Presentation not found".to_string(),
                    StudioError::InvalidOperation(_) => "No slides to save".to_string(),
                    other => format!("Could not save presentation: {other}"),
                }));
            }
        }
        result
    }

    fn try_save(&self) -> StudioResult<PresentationRecord> {
        if self.slides.is_empty() {
            return Err(StudioError::InvalidOperation("no slides to save".to_string()));
        }
        let mut record = PresentationRecord {
            id: ArtifactId::default(),
            title: String::new(),
            slides: self.slides.clone(),
            template: self.template,
            timestamp: self.repo.clock().now_millis(),
            slide_count: self.slides.len(),
        };
        match self.draft.bound() {
            Some(id) => {
                record.id = id;
                record.title = derive_deck_title(&self.title, "");
                self.repo.presentations().update_existing(record)
            }
            None => {
                record.id = self.repo.next_id();
                record.title = derive_deck_title(&self.title, &self.prompt);
                self.repo.presentations().upsert(record)
            }
        }
    }

    /// File name for exporting the deck with extension `ext`.
    #[must_use]
    pub fn export_file_name(&self, ext: &str) -> String {
        let stem = self
            .title
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        if stem.is_empty() {
            format!("presentation-{}.{ext}", self.repo.clock().now_millis())
        } else {
            format!("{stem}.{ext}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::presentation::DEFAULT_DECK_TITLE;
    use crate::common::clock::ManualClock;
    use crate::common::config::RetentionConfig;
    use crate::session::notice::NoticeLog;
    use crate::session::test_support::StubService;
    use crate::storage::MemoryLocalStore;

    fn repo() -> Arc<ArtifactRepository> {
        Arc::new(ArtifactRepository::new(
            Arc::new(MemoryLocalStore::new()),
            &RetentionConfig::default(),
            Arc::new(ManualClock::new(42)),
        ))
    }

    fn editor(repo: &Arc<ArtifactRepository>) -> (PresentationSession, Arc<NoticeLog>) {
        let log = Arc::new(NoticeLog::new());
        (PresentationSession::new(Arc::clone(repo), log.clone()), log)
    }

    #[tokio::test]
    async fn test_generate_logs_history() {
        let repo = repo();
        let (mut deck, _) = editor(&repo);
        let source = deck.generate(&StubService::default(), "Rust at work", None).await.unwrap();

        assert_eq!(source, DeckSource::Generated);
        assert_eq!(deck.title(), "Rust at work");
        assert_eq!(deck.slides().len(), 2);
        let history = repo.presentation_history().list();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "Rust at work");
    }

    #[tokio::test]
    async fn test_failed_generation_uses_fallback_without_history() {
        let repo = repo();
        let (mut deck, log) = editor(&repo);
        let source = deck.generate(&StubService::failing(), "Budget", Some(3)).await.unwrap();

        assert_eq!(source, DeckSource::Fallback);
        assert_eq!(deck.slides(), Deck::fallback("Budget").slides.as_slice());
        assert!(repo.presentation_history().list().is_empty());
        assert!(log.has_error());
    }

    #[tokio::test]
    async fn test_title_follows_first_slide() {
        let repo = repo();
        let (mut deck, _) = editor(&repo);
        deck.generate(&StubService::default(), "Draft", None).await.unwrap();

        deck.update_slide(0, SlideEdit::Title("Quarterly Review".to_string())).unwrap();
        let saved = deck.save().unwrap();
        assert_eq!(saved.title, "Quarterly Review");
        assert_eq!(saved.slide_count, 2);
    }

    #[tokio::test]
    async fn test_save_then_resave_updates_in_place() {
        let repo = repo();
        let (mut deck, _) = editor(&repo);
        deck.generate(&StubService::default(), "Topic", None).await.unwrap();
        let first = deck.save().unwrap();

        deck.add_slide();
        deck.set_template(Template::Dark);
        let second = deck.save().unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.slide_count, 3);
        assert_eq!(second.template, Template::Dark);
        assert_eq!(repo.presentations().list().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let repo = repo();
        let (mut deck, log) = editor(&repo);
        deck.generate(&StubService::default(), "Topic", None).await.unwrap();

        let last = deck.add_slide();
        assert_eq!(deck.select_slide(last), 2);
        deck.delete_slide(2).unwrap();
        assert_eq!(deck.current_index(), 1);
        assert!(deck.delete_slide(7).is_err());

        deck.delete_slide(0).unwrap();
        assert!(deck.delete_slide(0).is_err());
        assert_eq!(deck.slides().len(), 1);
        assert!(log.has_error());
    }

    #[tokio::test]
    async fn test_blanked_title_slide_renames_deck() {
        let repo = repo();
        let (mut deck, _) = editor(&repo);
        deck.generate(&StubService::default(), "Draft", None).await.unwrap();
        deck.update_slide(0, SlideEdit::Title("Quarterly Review".to_string())).unwrap();
        deck.save().unwrap();

        deck.update_slide(0, SlideEdit::Title(String::new())).unwrap();
        assert_eq!(deck.title(), "");
        let saved = deck.save().unwrap();
        assert_eq!(saved.slides[0].heading(), "");
        assert_eq!(saved.title, DEFAULT_DECK_TITLE);
    }

    #[tokio::test]
    async fn test_first_save_of_untitled_deck_uses_prompt() {
        let repo = repo();
        let (mut deck, _) = editor(&repo);
        deck.generate(&StubService::default(), "Ocean currents", None).await.unwrap();
        deck.update_slide(0, SlideEdit::Title(String::new())).unwrap();
        assert_eq!(deck.save().unwrap().title, "Ocean currents");
    }

    #[test]
    fn test_save_empty_is_rejected() {
        let repo = repo();
        let (mut deck, _) = editor(&repo);
        assert!(matches!(deck.save(), Err(StudioError::InvalidOperation(_))));
    }

    #[test]
    fn test_load_binds_and_export_name() {
        let repo = repo();
        let record = PresentationRecord {
            id: ArtifactId::from_millis(9),
            title: "Old".to_string(),
            slides: vec![Slide::title("Team  Offsite Plan", "2025")],
            template: Template::Gradient,
            timestamp: 9,
            slide_count: 1,
        };
        repo.presentations().upsert(record.clone()).unwrap();

        let (mut deck, _) = editor(&repo);
        deck.load(record);
        assert_eq!(deck.editing_id(), Some(ArtifactId::from_millis(9)));
        assert_eq!(deck.title(), "Team  Offsite Plan");
        assert_eq!(deck.export_file_name("pdf"), "team-offsite-plan.pdf");

        repo.presentations().remove(ArtifactId::from_millis(9)).unwrap();
        assert!(matches!(deck.save(), Err(StudioError::NotFound { .. })));
    }

    #[test]
    fn test_untitled_deck_falls_back() {
        let repo = repo();
        let (mut deck, _) = editor(&repo);
        deck.add_slide();
        assert_eq!(deck.export_file_name("pptx"), "presentation-42.pptx");
        let saved = deck.save().unwrap();
        assert_eq!(saved.title, "Presentation");
    }
}
