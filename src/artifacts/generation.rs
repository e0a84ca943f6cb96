//! Generation log entries.
//!
//! These record that something was generated, independently of whether the
//! user kept it. Each log is capped and newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifacts::presentation::{Slide, Template};
use crate::artifacts::{ArtifactKind, Record};
use crate::common::ids::ArtifactId;

const fn image_kind() -> ArtifactKind {
    ArtifactKind::Image
}

/// One generated (and downloaded) image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHistoryEntry {
    /// Log entry id.
    pub id: ArtifactId,
    /// Prompt the image was drawn from.
    pub prompt: String,
    /// Hosted image URL.
    pub image_url: String,
    /// When it was generated.
    pub timestamp: DateTime<Utc>,
    /// Always `image`.
    #[serde(rename = "type", default = "image_kind")]
    pub kind: ArtifactKind,
}

impl ImageHistoryEntry {
    /// Entry for an image generated at `timestamp`.
    #[must_use]
    pub fn new(
        id: ArtifactId,
        prompt: impl Into<String>,
        image_url: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            image_url: image_url.into(),
            timestamp,
            kind: ArtifactKind::Image,
        }
    }
}

/// One generated video.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoHistoryEntry {
    /// Log entry id.
    pub id: ArtifactId,
    /// Scene description.
    pub prompt: String,
    /// Clip URL.
    pub video_url: String,
    /// When it was generated.
    pub timestamp: DateTime<Utc>,
    /// Seconds.
    #[serde(default)]
    pub duration: u32,
}

/// One generated deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationHistoryEntry {
    /// Log entry id.
    pub id: ArtifactId,
    /// Deck title at generation time.
    pub title: String,
    /// Slides as generated, before any edits.
    pub slides: Vec<Slide>,
    /// Theme chosen for the deck.
    #[serde(default)]
    pub template: Template,
    /// When it was generated.
    pub created_at: DateTime<Utc>,
}

macro_rules! impl_record {
    ($ty:ty, $kind:expr) => {
        impl Record for $ty {
            const KIND: ArtifactKind = $kind;

            fn id(&self) -> ArtifactId {
                self.id
            }

            fn set_id(&mut self, id: ArtifactId) {
                self.id = id;
            }
        }
    };
}

impl_record!(ImageHistoryEntry, ArtifactKind::Image);
impl_record!(VideoHistoryEntry, ArtifactKind::Video);
impl_record!(PresentationHistoryEntry, ArtifactKind::Presentation);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_entry_layout() {
        let at = DateTime::from_timestamp_millis(0).unwrap();
        let entry = ImageHistoryEntry::new(ArtifactId::from_millis(9), "fox", "https://i/f.png", at);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["imageUrl"], "https://i/f.png");
        assert_eq!(json["type"], "image");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_presentation_entry_uses_created_at() {
        let raw = r#"{"id":1,"title":"T","slides":[],"template":"dark","createdAt":"2024-05-01T10:00:00Z"}"#;
        let entry: PresentationHistoryEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.template, Template::Dark);
        assert_eq!(entry.id(), ArtifactId::from_millis(1));
    }
}
