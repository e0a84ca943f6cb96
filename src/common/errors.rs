//! Error types shared by every AI Studio subsystem.

use thiserror::Error;

use crate::artifacts::ArtifactKind;
use crate::common::ids::ArtifactId;

/// AI Studio error type.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Generic storage backend failure.
    #[error("storage error: {0}")]
    Storage(String),
    /// Writing a value would exceed the store quota.
    #[error("storage quota exceeded writing `{key}`: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        limit: usize,
    },
    /// A stored collection could not be decoded.
    #[error("collection `{key}` is corrupt: {source}")]
    CorruptCollection {
        /// Storage key of the collection.
        key: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// `SQLite` storage error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A record expected to exist is missing.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Artifact kind that was looked up.
        kind: ArtifactKind,
        /// Missing identifier.
        id: ArtifactId,
    },
    /// The requested edit is not allowed in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// HTTP client error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// A generation endpoint answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the body.
        message: String,
    },
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl StudioError {
    /// Whether the error came from the local store (quota, corruption, backend).
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::QuotaExceeded { .. }
                | Self::CorruptCollection { .. }
                | Self::Sqlite(_)
        )
    }

    /// HTTP status reported by an upstream service, if any.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Convenience result alias for AI Studio operations.
pub type StudioResult<T> = Result<T, StudioError>;
