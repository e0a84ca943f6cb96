//! The four editors side by side, plus which one is in front.

use std::sync::Arc;

use tracing::debug;

use crate::artifacts::{ArtifactKind, ArtifactRecord};
use crate::common::config::ChatIdentity;
use crate::repository::ArtifactRepository;
use crate::session::canvas::Compositor;
use crate::session::chat::ChatSession;
use crate::session::image::ImageSession;
use crate::session::notice::Notifier;
use crate::session::presentation::PresentationSession;
use crate::session::video::VideoSession;

/// One editor per artifact kind.
pub struct Workspace {
    /// Chat editor.
    pub chat: ChatSession,
    /// Image editor.
    pub image: ImageSession,
    /// Deck editor.
    pub presentation: PresentationSession,
    /// Video editor.
    pub video: VideoSession,
    active: ArtifactKind,
}

impl Workspace {
    /// All editors, sharing one repository and notifier. Chat is active.
    #[must_use]
    pub fn new(
        repo: &Arc<ArtifactRepository>,
        notifier: &Arc<dyn Notifier>,
        compositor: Arc<dyn Compositor>,
        identity: ChatIdentity,
    ) -> Self {
        Self {
            chat: ChatSession::new(Arc::clone(repo), Arc::clone(notifier), identity),
            image: ImageSession::new(Arc::clone(repo), Arc::clone(notifier), compositor),
            presentation: PresentationSession::new(Arc::clone(repo), Arc::clone(notifier)),
            video: VideoSession::new(Arc::clone(repo), Arc::clone(notifier)),
            active: ArtifactKind::Chat,
        }
    }

    /// Editor currently shown.
    #[must_use]
    pub const fn active(&self) -> ArtifactKind {
        self.active
    }

    /// Show the editor for `kind`.
    pub fn activate(&mut self, kind: ArtifactKind) {
        self.active = kind;
    }

    /// Load `record` into its editor and bring that editor to the front.
    pub fn open(&mut self, record: ArtifactRecord) {
        let kind = record.kind();
        debug!(%kind, id = %record.id(), "opening artifact");
        match record {
            ArtifactRecord::Chat(r) => self.chat.load(r),
            ArtifactRecord::Image(r) => self.image.load(r),
            ArtifactRecord::Video(r) => self.video.load(r),
            ArtifactRecord::Presentation(r) => self.presentation.load(r),
        }
        self.active = kind;
    }
}
