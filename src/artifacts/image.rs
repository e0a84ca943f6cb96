//! Saved image records.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ArtifactKind, Record};
use crate::common::ids::ArtifactId;

/// Prompt stored when an image is saved without one.
pub const DEFAULT_IMAGE_PROMPT: &str = "Generated image";

/// An image kept by the user, with its editable base and annotation overlay.
///
/// `url` is the flattened snapshot made at the last save. Reopening for edit
/// starts from `original_url` and replays `canvas_data` on top of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Record id.
    pub id: ArtifactId,
    /// Composite of base image and annotations.
    pub url: String,
    /// Untouched generated image.
    #[serde(default)]
    pub original_url: String,
    /// Serialized annotation layer, if any.
    #[serde(default)]
    pub canvas_data: Option<String>,
    /// Prompt that produced the image.
    #[serde(default)]
    pub prompt: String,
    /// Last save time, epoch millis.
    pub timestamp: i64,
    /// Requested size such as `1024x1024`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ImageRecord {
    /// Base image to edit from. Records written before `originalUrl`
    /// existed fall back to the composite.
    #[must_use]
    pub fn editable_base(&self) -> &str {
        if self.original_url.is_empty() {
            &self.url
        } else {
            &self.original_url
        }
    }
}

impl Record for ImageRecord {
    const KIND: ArtifactKind = ArtifactKind::Image;

    fn id(&self) -> ArtifactId {
        self.id
    }

    fn set_id(&mut self, id: ArtifactId) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_without_original_url() {
        let raw = r#"{"id":3,"url":"https://img/x.png","prompt":"cat","timestamp":3}"#;
        let record: ImageRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.editable_base(), "https://img/x.png");
        assert!(record.canvas_data.is_none());
        assert!(record.size.is_none());
    }

    #[test]
    fn test_field_names() {
        let record = ImageRecord {
            id: ArtifactId::from_millis(1),
            url: "u".to_string(),
            original_url: "o".to_string(),
            canvas_data: None,
            prompt: "p".to_string(),
            timestamp: 1,
            size: Some("1024x1024".to_string()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["originalUrl"], "o");
        assert!(json["canvasData"].is_null());
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(record.editable_base(), "o");
    }
}
