//! Chat editor: the active conversation and its autosave.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::ChatRequest;
use crate::artifacts::{ChatMessage, ChatRecord};
use crate::common::config::ChatIdentity;
use crate::common::errors::{StudioError, StudioResult};
use crate::common::ids::ArtifactId;
use crate::repository::ArtifactRepository;
use crate::services::GenerationService;
use crate::session::draft::{DraftState, DraftStatus};
use crate::session::notice::{Notice, Notifier};

/// Assistant text shown when the chat endpoint fails.
pub const CHAT_ERROR_REPLY: &str = "Sorry, something went wrong. Please try again later.";

/// The conversation being written.
pub struct ChatSession {
    repo: Arc<ArtifactRepository>,
    notifier: Arc<dyn Notifier>,
    identity: ChatIdentity,
    messages: Vec<ChatMessage>,
    draft: DraftState,
}

impl ChatSession {
    /// Empty session.
    #[must_use]
    pub fn new(
        repo: Arc<ArtifactRepository>,
        notifier: Arc<dyn Notifier>,
        identity: ChatIdentity,
    ) -> Self {
        Self {
            repo,
            notifier,
            identity,
            messages: Vec::new(),
            draft: DraftState::new(),
        }
    }

    /// Messages of the working conversation.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Save state of the conversation.
    #[must_use]
    pub const fn status(&self) -> DraftStatus {
        self.draft.status()
    }

    /// Id of the stored conversation this session writes to.
    #[must_use]
    pub const fn conversation_id(&self) -> Option<ArtifactId> {
        self.draft.bound()
    }

    /// Append a message without saving.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.draft.mark_dirty();
    }

    /// Flush unsaved messages, then start an empty conversation.
    pub fn start_new(&mut self) {
        if self.draft.is_dirty() {
            self.autosave();
        }
        self.messages.clear();
        self.draft.reset();
        self.notifier.notify(Notice::success("New chat started"));
    }

    /// Make `record` the working conversation. Unsaved messages are flushed
    /// first unless they are exactly the record being opened.
    pub fn load(&mut self, record: ChatRecord) {
        let same = self.draft.bound() == Some(record.id) && self.messages == record.messages;
        if self.draft.is_dirty() && !same {
            self.autosave();
        }
        debug!(id = %record.id, messages = record.messages.len(), "loading chat");
        self.messages = record.messages;
        self.draft.load(record.id);
        self.notifier.notify(Notice::success("Chat loaded"));
    }

    /// Write the conversation. The first save assigns its id.
    ///
    /// # Errors
    /// Returns `InvalidOperation` when there are no messages, or the
    /// repository error when the write fails. Messages stay in memory.
    pub fn save(&mut self) -> StudioResult<ChatRecord> {
        if self.messages.is_empty() {
            return Err(StudioError::InvalidOperation(
                "no messages to save".to_string(),
            ));
        }
        let id = self.draft.bound().unwrap_or_else(|| self.repo.next_id());
        let record = ChatRecord::snapshot(id, self.messages.clone(), self.repo.clock().now());

        let saved = match self.identity {
            ChatIdentity::Id => self.repo.chats().upsert(record)?,
            ChatIdentity::IdOrTitle => {
                let title = record.title.clone();
                self.repo.chats().upsert_by(record, |r| r.title == title)?
            }
        };
        self.draft.mark_clean(saved.id);
        debug!(id = %saved.id, count = saved.message_count, "chat saved");
        Ok(saved)
    }

    /// Save if there is anything to save. Failures become an error notice.
    pub fn autosave(&mut self) -> Option<ChatRecord> {
        if self.messages.is_empty() {
            return None;
        }
        match self.save() {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "chat autosave failed");
                self.notifier
                    .notify(Notice::error(format!("Could not save conversation: {err}")));
                None
            }
        }
    }

    /// Send `text`, append the reply, then autosave.
    ///
    /// A failed request appends an error reply instead and raises a notice;
    /// it is not returned as an error.
    ///
    /// # Errors
    /// Returns `InvalidOperation` when `text` is blank.
    pub async fn send(
        &mut self,
        service: &dyn GenerationService,
        text: &str,
    ) -> StudioResult<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StudioError::InvalidOperation(
                "message is empty".to_string(),
            ));
        }
        let clock = Arc::clone(self.repo.clock());
        self.push_message(ChatMessage::user(text, clock.now()));

        let request = ChatRequest {
            message: text.to_string(),
            conversation_id: self.draft.bound(),
        };
        let reply = match service.chat(request).await {
            Ok(reply) => ChatMessage::assistant(reply.message, clock.now()),
            Err(err) => {
                warn!(error = %err, "chat request failed");
                self.notifier.notify(Notice::error("Message could not be sent"));
                ChatMessage::assistant_error(CHAT_ERROR_REPLY, clock.now())
            }
        };
        self.push_message(reply.clone());
        self.autosave();
        Ok(reply)
    }
}
