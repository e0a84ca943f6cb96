//! Request and response bodies of the generation API.
//!
//! Shared by the axum backend and the HTTP client the sessions use.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::artifacts::{Slide, Template};
use crate::common::ids::ArtifactId;

/// Chat endpoint request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// User message, possibly a `/command`.
    #[serde(default)]
    pub message: String,
    /// Conversation the message belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ArtifactId>,
}

/// Chat endpoint reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Assistant message (markdown).
    pub message: String,
    /// Conversation id echoed back, or a new one.
    pub conversation_id: ArtifactId,
    /// Model that answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Total tokens used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
    /// Set when a `/command` was handled instead of a completion.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_command: bool,
    /// Image produced by `/image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Prompt extracted from the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Image endpoint request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    /// Text to render.
    #[serde(default)]
    pub prompt: String,
    /// `1024x1024` for square, anything else for landscape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// `standard` or `hd`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

/// Image endpoint reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReply {
    /// Hosted image URL.
    pub image_url: String,
    /// Prompt echoed back.
    pub prompt: String,
    /// Model that drew the image.
    #[serde(default)]
    pub model: String,
    /// Prompt as rewritten by the provider.
    #[serde(default)]
    pub revised_prompt: String,
}

/// Presentation endpoint request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequest {
    /// Topic of the deck.
    #[serde(default)]
    pub prompt: String,
    /// Visual theme, `modern` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    /// Requested slide count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_slides: Option<u32>,
}

/// Presentation endpoint reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationReply {
    /// Deck title.
    pub title: String,
    /// Generated slides in order.
    pub slides: Vec<Slide>,
    /// Theme the deck was generated for.
    #[serde(default)]
    pub template: Template,
    /// Prompt echoed back.
    #[serde(default)]
    pub prompt: String,
    /// Model name, or `fallback` when the fixed deck was substituted.
    #[serde(default)]
    pub generated_by: String,
}

/// Video endpoint request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    /// Scene description.
    #[serde(default)]
    pub prompt: String,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

/// Status value the backend reports for placeholder videos.
pub const VIDEO_STATUS_DEMO: &str = "demo";

/// Video endpoint reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReply {
    /// Clip URL.
    pub video_url: String,
    /// Prompt echoed back.
    pub prompt: String,
    /// Clip length in seconds.
    #[serde(default)]
    pub duration: u32,
    /// `demo` for placeholder clips.
    pub status: String,
    /// Human-readable note from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VideoReply {
    /// Whether the clip is a placeholder.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.status == VIDEO_STATUS_DEMO
    }
}

/// Video status endpoint reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    /// Backend id of the clip.
    pub video_id: String,
    /// `processing`, `completed` or `demo`.
    pub status: String,
    /// Clip URL once ready.
    pub video_url: String,
}

/// Health endpoint reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReply {
    /// Always `ok`.
    pub status: String,
    /// Greeting shown by the status check.
    pub message: String,
    /// RFC 3339 server time.
    pub timestamp: String,
}

/// Error body returned with every non-2xx status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short error message.
    pub error: String,
    /// Underlying cause, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_wire_names() {
        let body: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","conversationId":17}"#).unwrap();
        assert_eq!(body.conversation_id, Some(ArtifactId::from_millis(17)));

        let body: ChatRequest = serde_json::from_str(r#"{"message":"hi","conversationId":null}"#).unwrap();
        assert!(body.conversation_id.is_none());
    }

    #[test]
    fn test_chat_reply_omits_command_fields() {
        let reply = ChatReply {
            message: "hello".to_string(),
            conversation_id: ArtifactId::from_millis(3),
            model: Some("llama".to_string()),
            tokens: Some(12),
            ..ChatReply::default()
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["conversationId"], 3);
        assert!(json.get("isCommand").is_none());
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_presentation_request_defaults() {
        let body: PresentationRequest = serde_json::from_str(r#"{"prompt":"AI"}"#).unwrap();
        assert!(body.template.is_none());
        assert!(body.number_of_slides.is_none());

        let body: PresentationRequest =
            serde_json::from_str(r#"{"prompt":"AI","template":"gradient","numberOfSlides":7}"#)
                .unwrap();
        assert_eq!(body.template, Some(Template::Gradient));
        assert_eq!(body.number_of_slides, Some(7));
    }
}
