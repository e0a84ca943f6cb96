//! Chat-completion backends used by the server.

pub mod openai;

use async_trait::async_trait;

use crate::common::errors::StudioResult;

pub use openai::OpenAiCompatClient;

/// One system + user exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    /// System prompt.
    pub system: String,
    /// User message.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion length cap.
    pub max_tokens: u32,
}

/// Model answer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completion {
    /// Text of the first choice.
    pub content: String,
    /// Model that answered.
    pub model: String,
    /// Total tokens billed, when reported.
    pub total_tokens: Option<u32>,
}

/// A chat-completion provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion.
    ///
    /// # Errors
    /// Returns `InvalidConfig` when no API key is configured, `Upstream`
    /// when the provider rejects the call, or the transport error.
    async fn complete(&self, request: CompletionRequest) -> StudioResult<Completion>;

    /// Model requests are sent to.
    fn model_name(&self) -> &str;
}
