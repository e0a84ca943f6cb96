//! Persisted artifact records.
//!
//! Each collection stores one record type as a JSON array, newest first.
//! Field names follow the browser-storage layout (`originalUrl`,
//! `messageCount`, ...) so existing blobs load unchanged.

pub mod chat;
pub mod generation;
pub mod image;
pub mod presentation;
pub mod video;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::common::ids::ArtifactId;

pub use chat::{ChatMessage, ChatRecord, ChatRole, UNTITLED_CHAT, derive_chat_title};
pub use generation::{ImageHistoryEntry, PresentationHistoryEntry, VideoHistoryEntry};
pub use image::ImageRecord;
pub use presentation::{Deck, PresentationRecord, Slide, SlideEdit, Template};
pub use video::VideoRecord;

/// Artifact family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Chat conversation.
    Chat,
    /// Image with optional annotations.
    Image,
    /// Video clip.
    Video,
    /// Slide deck.
    Presentation,
}

impl ArtifactKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Image => "image",
            Self::Video => "video",
            Self::Presentation => "presentation",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that can live in a repository collection.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Artifact family of the record.
    const KIND: ArtifactKind;

    /// Record identity.
    fn id(&self) -> ArtifactId;

    /// Rebind the record to another identity.
    fn set_id(&mut self, id: ArtifactId);
}

/// Any saved artifact, as handed between the history view and the sessions.
#[derive(Clone, Debug, PartialEq)]
pub enum ArtifactRecord {
    /// Chat conversation.
    Chat(ChatRecord),
    /// Saved image.
    Image(ImageRecord),
    /// Saved video.
    Video(VideoRecord),
    /// Saved presentation.
    Presentation(PresentationRecord),
}

impl ArtifactRecord {
    /// Artifact family.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        match self {
            Self::Chat(_) => ArtifactKind::Chat,
            Self::Image(_) => ArtifactKind::Image,
            Self::Video(_) => ArtifactKind::Video,
            Self::Presentation(_) => ArtifactKind::Presentation,
        }
    }

    /// Record identity.
    #[must_use]
    pub fn id(&self) -> ArtifactId {
        match self {
            Self::Chat(r) => r.id(),
            Self::Image(r) => r.id(),
            Self::Video(r) => r.id(),
            Self::Presentation(r) => r.id(),
        }
    }

    /// Human-readable label for lists.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Chat(r) => &r.title,
            Self::Image(r) => &r.prompt,
            Self::Video(r) => &r.prompt,
            Self::Presentation(r) => &r.title,
        }
    }
}

impl From<ChatRecord> for ArtifactRecord {
    fn from(value: ChatRecord) -> Self {
        Self::Chat(value)
    }
}

impl From<ImageRecord> for ArtifactRecord {
    fn from(value: ImageRecord) -> Self {
        Self::Image(value)
    }
}

impl From<VideoRecord> for ArtifactRecord {
    fn from(value: VideoRecord) -> Self {
        Self::Video(value)
    }
}

impl From<PresentationRecord> for ArtifactRecord {
    fn from(value: PresentationRecord) -> Self {
        Self::Presentation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ArtifactKind::Presentation).unwrap(),
            "\"presentation\""
        );
        assert_eq!(ArtifactKind::Chat.to_string(), "chat");
    }

    #[test]
    fn test_artifact_record_dispatch() {
        let video = VideoRecord {
            id: ArtifactId::from_millis(7),
            url: "https://example.com/v.mp4".to_string(),
            prompt: "waves".to_string(),
            duration: 3,
            timestamp: 7,
        };
        let record = ArtifactRecord::from(video);
        assert_eq!(record.kind(), ArtifactKind::Video);
        assert_eq!(record.id(), ArtifactId::from_millis(7));
        assert_eq!(record.label(), "waves");
    }
}
