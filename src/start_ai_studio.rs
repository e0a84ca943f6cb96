//! Startup helpers for the AI Studio backend.

use std::process::ExitCode;
use std::sync::Arc;

use crate::common::config::{AiProvider, StudioConfig};
use crate::server::{self, AppState};

/// Run the server (used by the `ai-studio-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting AI Studio API v{}", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(e) => tracing::debug!("No .env file loaded: {e}"),
    }

    let (config, state) = match initialize() {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!("Failed to initialize: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(
        state,
        config.server.port,
        shutdown_signal(),
    )) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("AI Studio API stopped");
    ExitCode::SUCCESS
}

/// Load configuration and build the server state without starting it.
///
/// # Errors
/// Returns an error if the configuration is invalid or state creation fails.
pub fn initialize() -> Result<(StudioConfig, Arc<AppState>), Box<dyn std::error::Error + Send + Sync>> {
    let config = StudioConfig::from_env()?;
    let provider = match config.provider.provider {
        AiProvider::Groq => "Groq",
        AiProvider::OpenAi => "OpenAI",
    };
    tracing::info!(
        "AI provider: {provider} ({}), model {}",
        config.provider.base_url(),
        config.provider.model()
    );

    let state = AppState::new(&config).map_err(|e| format!("Failed to create state: {e}"))?;
    Ok((config, state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
