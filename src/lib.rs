//! AI Studio: chat, image, presentation and video workspaces over a local
//! artifact store, plus the HTTP backend that proxies the AI providers.

// No unsafe, no silently dropped results.
#![deny(unsafe_code)]
#![deny(unused_must_use)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
// Clippy discipline; tests may unwrap.
#![deny(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::redundant_clone)]
#![deny(overflowing_literals)]
#![deny(missing_docs)]

/// Wire types of the generation API.
pub mod api;
/// Saved artifacts and generation-log entries.
pub mod artifacts;
/// Errors, ids, clock and configuration.
pub mod common;
/// History and saved-artifact views.
pub mod history;
/// Chat-completion providers.
pub mod llm;
/// Typed collections over the local store.
pub mod repository;
/// HTTP server and API routes.
#[allow(clippy::unused_async)]
pub mod server;
/// Clients of the generation API.
pub mod services;
/// Editors and their save lifecycle.
pub mod session;
/// Entry helpers to start the backend.
pub mod start_ai_studio;
/// Key/value local store backends.
pub mod storage;
/// Client façade.
pub mod studio;

pub use common::errors::{StudioError, StudioResult};
pub use studio::Studio;
