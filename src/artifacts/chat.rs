//! Chat conversation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::artifacts::{ArtifactKind, Record};
use crate::common::ids::ArtifactId;

/// Title used when a conversation has no user message yet.
pub const UNTITLED_CHAT: &str = "Untitled conversation";

/// Maximum characters of the first user message kept as the title.
const TITLE_CHARS: usize = 50;

/// Author of a chat message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// User input.
    User,
    /// Model reply.
    Assistant,
}

impl ChatRole {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Author.
    pub role: ChatRole,
    /// Message body (markdown for assistant replies).
    pub content: String,
    /// When the message was added.
    pub timestamp: DateTime<Utc>,
    /// Set on the placeholder reply written when the chat endpoint failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ChatMessage {
    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp,
            is_error: false,
        }
    }

    /// Build an assistant reply.
    #[must_use]
    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp,
            is_error: false,
        }
    }

    /// Build the assistant placeholder shown when a reply could not be fetched.
    #[must_use]
    pub fn assistant_error(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(content, timestamp)
        }
    }
}

/// Title for a conversation: the first user message, truncated.
#[must_use]
pub fn derive_chat_title(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .find(|m| m.role == ChatRole::User)
        .map(|m| m.content.chars().take(TITLE_CHARS).collect::<String>())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED_CHAT.to_string())
}

const fn chat_kind() -> ArtifactKind {
    ArtifactKind::Chat
}

/// A saved conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    /// Conversation id.
    pub id: ArtifactId,
    /// Display title derived from the first user message.
    pub title: String,
    /// Messages in order.
    pub messages: Vec<ChatMessage>,
    /// Last-modified time.
    pub timestamp: DateTime<Utc>,
    /// Cached `messages.len()`.
    pub message_count: usize,
    /// Always `chat`.
    #[serde(rename = "type", default = "chat_kind")]
    pub kind: ArtifactKind,
}

impl ChatRecord {
    /// Snapshot a working message list.
    #[must_use]
    pub fn snapshot(id: ArtifactId, messages: Vec<ChatMessage>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: derive_chat_title(&messages),
            message_count: messages.len(),
            messages,
            timestamp: now,
            kind: ArtifactKind::Chat,
        }
    }
}

impl Record for ChatRecord {
    const KIND: ArtifactKind = ArtifactKind::Chat;

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

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_title_from_first_user_message() {
        let messages = vec![
            ChatMessage::assistant("Welcome", at(0)),
            ChatMessage::user("How do lifetimes work?", at(1)),
            ChatMessage::user("second", at(2)),
        ];
        assert_eq!(derive_chat_title(&messages), "How do lifetimes work?");
    }

    #[test]
    fn test_title_truncated_to_fifty_chars() {
        let long = "é".repeat(80);
        let title = derive_chat_title(&[ChatMessage::user(long, at(0))]);
        assert_eq!(title.chars().count(), 50);
    }

    #[test]
    fn test_title_fallback() {
        assert_eq!(derive_chat_title(&[]), UNTITLED_CHAT);
        assert_eq!(
            derive_chat_title(&[ChatMessage::user("", at(0))]),
            UNTITLED_CHAT
        );
    }

    #[test]
    fn test_record_json_layout() {
        let record = ChatRecord::snapshot(
            ArtifactId::from_millis(1),
            vec![
                ChatMessage::user("hi", at(0)),
                ChatMessage::assistant_error("failed", at(1)),
            ],
            at(2),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["messageCount"], 2);
        assert_eq!(json["type"], "chat");
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json["messages"][0].get("isError").is_none());
        assert_eq!(json["messages"][1]["isError"], true);
    }

    #[test]
    fn test_record_without_type_field_loads() {
        let raw = r#"{"id":5,"title":"t","messages":[],"timestamp":"2024-01-01T00:00:00Z","messageCount":0}"#;
        let record: ChatRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.kind, ArtifactKind::Chat);
        assert_eq!(record.id, ArtifactId::from_millis(5));
    }
}
