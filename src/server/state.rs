//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::common::clock::{Clock, SystemClock};
use crate::common::config::StudioConfig;
use crate::common::errors::StudioResult;
use crate::llm::{CompletionBackend, OpenAiCompatClient};

/// Shared application state.
pub struct AppState {
    /// Chat-completion provider.
    pub backend: Arc<dyn CompletionBackend>,
    /// Sampling temperature for every completion.
    pub temperature: f32,
    /// Token budget of chat replies.
    pub chat_max_tokens: u32,
    /// Token budget of generated decks.
    pub presentation_max_tokens: u32,
    /// Directory served for non-API paths.
    pub static_dir: Option<PathBuf>,
    /// Time source for timestamps and image seeds.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State backed by the configured provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &StudioConfig) -> StudioResult<Arc<Self>> {
        let backend = Arc::new(OpenAiCompatClient::new(&config.provider)?);
        Ok(Arc::new(Self::with_backend(
            backend,
            config,
            Arc::new(SystemClock),
        )))
    }

    /// State around an existing backend.
    #[must_use]
    pub fn with_backend(
        backend: Arc<dyn CompletionBackend>,
        config: &StudioConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            temperature: config.provider.temperature,
            chat_max_tokens: config.provider.chat_max_tokens,
            presentation_max_tokens: config.provider.presentation_max_tokens,
            static_dir: config.server.static_dir.clone(),
            clock,
        }
    }
}
