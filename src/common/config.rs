//! Configuration for the studio: retention, refresh cadence, storage, server
//! and upstream provider settings.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::common::errors::{StudioError, StudioResult};

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Groq OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default Groq chat model.
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
/// Default OpenAI chat model.
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Top-level studio configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Collection retention caps.
    pub retention: RetentionConfig,
    /// History view refresh settings.
    pub refresh: RefreshConfig,
    /// Local store settings.
    pub storage: StorageConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Upstream chat-completion provider.
    pub provider: ProviderConfig,
    /// How chat saves find the record they update.
    pub chat_identity: ChatIdentity,
}

impl StudioConfig {
    /// Build a configuration from process environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparsable value.
    pub fn from_env() -> StudioResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> StudioResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.server.port = parse_var("PORT", &port)?;
        }
        config.server.static_dir = lookup("AI_STUDIO_STATIC_DIR").map(PathBuf::from);
        if let Some(url) = lookup("AI_STUDIO_BACKEND_URL") {
            config.server.backend_url = url;
        }

        if let Some(provider) = lookup("AI_PROVIDER") {
            config.provider.provider = provider.parse()?;
        }
        config.provider.api_key = match config.provider.provider {
            AiProvider::Groq => lookup("GROQ_API_KEY"),
            AiProvider::OpenAi => lookup("OPENAI_API_KEY"),
        }
        .filter(|key| !key.trim().is_empty() && key != "YOUR_GROQ_API_KEY_HERE");
        config.provider.base_url = lookup("AI_STUDIO_BASE_URL");
        config.provider.model = lookup("AI_STUDIO_MODEL");

        config.storage.sqlite_path = lookup("AI_STUDIO_DB_PATH").map(PathBuf::from);
        if let Some(quota) = lookup("AI_STUDIO_QUOTA_BYTES") {
            config.storage.quota_bytes = Some(parse_var("AI_STUDIO_QUOTA_BYTES", &quota)?);
        }

        if let Some(ms) = lookup("AI_STUDIO_REFRESH_MS") {
            config.refresh.interval_ms = parse_var("AI_STUDIO_REFRESH_MS", &ms)?;
        }
        if let Some(identity) = lookup("AI_STUDIO_CHAT_IDENTITY") {
            config.chat_identity = identity.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> StudioResult<()> {
        if self.retention.chat_history == 0 {
            return Err(StudioError::InvalidConfig(
                "retention.chat_history must be > 0".to_string(),
            ));
        }
        if self.retention.generation_history == 0 {
            return Err(StudioError::InvalidConfig(
                "retention.generation_history must be > 0".to_string(),
            ));
        }
        if self.retention.saved == Some(0) {
            return Err(StudioError::InvalidConfig(
                "retention.saved must be > 0 when set".to_string(),
            ));
        }
        if self.refresh.interval_ms == 0 {
            return Err(StudioError::InvalidConfig(
                "refresh.interval_ms must be > 0".to_string(),
            ));
        }
        if self.storage.quota_bytes == Some(0) {
            return Err(StudioError::InvalidConfig(
                "storage.quota_bytes must be > 0 when set".to_string(),
            ));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(StudioError::InvalidConfig(
                "provider.timeout_seconds must be > 0".to_string(),
            ));
        }
        Url::parse(&self.provider.base_url())?;
        Url::parse(&self.server.backend_url)?;
        Ok(())
    }

    /// Set the chat identity rule.
    #[must_use]
    pub const fn with_chat_identity(mut self, identity: ChatIdentity) -> Self {
        self.chat_identity = identity;
        self
    }

    /// Set the chat history cap.
    #[must_use]
    pub const fn with_chat_history_cap(mut self, cap: usize) -> Self {
        self.retention.chat_history = cap;
        self
    }

    /// Set the history refresh interval.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh.interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> StudioResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| StudioError::InvalidConfig(format!("{name} has invalid value `{value}`")))
}

/// Retention caps per collection family.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Maximum stored chat conversations.
    pub chat_history: usize,
    /// Maximum entries in each generation log.
    pub generation_history: usize,
    /// Optional cap for saved images, videos and presentations.
    pub saved: Option<usize>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            chat_history: 50,
            generation_history: 20,
            saved: None,
        }
    }
}

/// History view refresh settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Polling interval in milliseconds.
    pub interval_ms: u64,
}

impl RefreshConfig {
    /// Polling interval as a duration.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_ms: 2_000 }
    }
}

/// Local store settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path; in-memory store when absent.
    pub sqlite_path: Option<PathBuf>,
    /// Optional quota in bytes for the in-memory store.
    pub quota_bytes: Option<usize>,
}

impl StorageConfig {
    /// Whether saved artifacts outlive the process.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        self.sqlite_path.is_some()
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Directory served for non-API paths.
    pub static_dir: Option<PathBuf>,
    /// Base URL the client uses to reach the API.
    pub backend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
            backend_url: format!("http://127.0.0.1:{DEFAULT_PORT}/api"),
        }
    }
}

/// Upstream chat-completion provider family.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    /// Groq's OpenAI-compatible API.
    #[default]
    Groq,
    /// OpenAI API.
    OpenAi,
}

impl FromStr for AiProvider {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            other => Err(StudioError::InvalidConfig(format!(
                "unknown AI_PROVIDER `{other}`"
            ))),
        }
    }
}

/// Chat-completion provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider family.
    pub provider: AiProvider,
    /// API key; requests fail with a configuration error when missing.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Model override.
    pub model: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token budget for chat replies.
    pub chat_max_tokens: u32,
    /// Token budget for presentation decks.
    pub presentation_max_tokens: u32,
}

impl ProviderConfig {
    /// Effective base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            match self.provider {
                AiProvider::Groq => GROQ_BASE_URL,
                AiProvider::OpenAi => OPENAI_BASE_URL,
            }
            .to_string()
        })
    }

    /// Effective model name.
    #[must_use]
    pub fn model(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.provider {
                AiProvider::Groq => GROQ_MODEL,
                AiProvider::OpenAi => OPENAI_MODEL,
            }
            .to_string()
        })
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Groq,
            api_key: None,
            base_url: None,
            model: None,
            timeout_seconds: 120,
            temperature: 0.7,
            chat_max_tokens: 1_000,
            presentation_max_tokens: 3_000,
        }
    }
}

/// Rule used to decide which stored chat a save updates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatIdentity {
    /// Match only by the bound conversation id.
    #[default]
    Id,
    /// Also match any stored chat with the same derived title.
    IdOrTitle,
}

impl FromStr for ChatIdentity {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "id_or_title" | "title" => Ok(Self::IdOrTitle),
            other => Err(StudioError::InvalidConfig(format!(
                "unknown chat identity `{other}`"
            ))),
        }
    }
}
