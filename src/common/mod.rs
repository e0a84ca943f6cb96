//! Shared building blocks: errors, identifiers, clock and configuration.

pub mod clock;
pub mod config;
pub mod errors;
pub mod ids;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    AiProvider, ChatIdentity, ProviderConfig, RefreshConfig, RetentionConfig, ServerConfig,
    StorageConfig, StudioConfig,
};
pub use errors::{StudioError, StudioResult};
pub use ids::{ArtifactId, IdGenerator};
