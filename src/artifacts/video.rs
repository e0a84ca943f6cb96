//! Saved video records.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ArtifactKind, Record};
use crate::common::ids::ArtifactId;

/// Prompt stored when a video is saved without one.
pub const DEFAULT_VIDEO_PROMPT: &str = "Generated video";

/// A video kept by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Record id.
    pub id: ArtifactId,
    /// Playable URL.
    pub url: String,
    /// Prompt that produced the clip.
    #[serde(default)]
    pub prompt: String,
    /// Requested duration in seconds.
    #[serde(default)]
    pub duration: u32,
    /// Save time, epoch millis.
    pub timestamp: i64,
}

impl Record for VideoRecord {
    const KIND: ArtifactKind = ArtifactKind::Video;

    fn id(&self) -> ArtifactId {
        self.id
    }

    fn set_id(&mut self, id: ArtifactId) {
        self.id = id;
    }
}
