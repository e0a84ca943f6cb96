//! HTTP route handlers for the AI Studio API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::SecondsFormat;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::api::{
    ChatReply, ChatRequest, ErrorBody, HealthReply, ImageReply, ImageRequest, PresentationReply,
    PresentationRequest, VIDEO_STATUS_DEMO, VideoReply, VideoRequest, VideoStatus,
};
use crate::artifacts::Deck;
use crate::common::ids::ArtifactId;
use crate::llm::CompletionRequest;

use super::commands::{
    ChatCommand, DEMO_VIDEO_URL, IMAGE_MODEL, IMAGE_USAGE, SLIDES_HINT, STATUS_VIDEO_URL,
    VIDEO_HINT, image_reply, pollinations_url,
};
use super::error::ApiError;
use super::state::AppState;

const CHAT_SYSTEM_PROMPT: &str = "You are a helpful, friendly and professional AI assistant. \
Answer clearly and concisely. You can help with general questions, technical explanations, \
creative writing and much more.";

const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
const DEFAULT_SLIDE_COUNT: u32 = 5;
const DEFAULT_VIDEO_DURATION: u32 = 5;
const FALLBACK_GENERATOR: &str = "fallback";

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/image/generate", post(generate_image))
        .route("/api/presentation/generate", post(generate_presentation))
        .route("/api/video/generate", post(generate_video))
        .route("/api/video/status/{video_id}", get(video_status));

    let router = match &state.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };
    router.with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthReply> {
    Json(HealthReply {
        status: "OK".to_string(),
        message: "AI Studio API is running".to_string(),
        timestamp: state.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Endpoint not found".to_string(),
            details: Some(uri.path().to_string()),
        }),
    )
}

/// Chat message: a slash-command, or one completion.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }
    let conversation_id = request
        .conversation_id
        .unwrap_or_else(|| ArtifactId::from_millis(state.clock.now_millis()));

    if let Some(command) = ChatCommand::parse(&request.message) {
        info!(?command, "chat command");
        let reply = match command {
            ChatCommand::Image(prompt) if prompt.is_empty() => ChatReply {
                message: IMAGE_USAGE.to_string(),
                ..ChatReply::default()
            },
            ChatCommand::Image(prompt) => {
                let url = pollinations_url(&prompt, DEFAULT_IMAGE_SIZE, state.clock.now_millis());
                ChatReply {
                    message: image_reply(&prompt, &url),
                    image_url: Some(url),
                    prompt: Some(prompt),
                    ..ChatReply::default()
                }
            }
            ChatCommand::Video => ChatReply {
                message: VIDEO_HINT.to_string(),
                ..ChatReply::default()
            },
            ChatCommand::Slides => ChatReply {
                message: SLIDES_HINT.to_string(),
                ..ChatReply::default()
            },
        };
        return Ok(Json(ChatReply {
            conversation_id,
            is_command: true,
            ..reply
        }));
    }

    let completion = state
        .backend
        .complete(CompletionRequest {
            system: CHAT_SYSTEM_PROMPT.to_string(),
            user: request.message,
            temperature: state.temperature,
            max_tokens: state.chat_max_tokens,
        })
        .await
        .map_err(|err| ApiError::from_studio("Failed to process chat message", &err))?;

    Ok(Json(ChatReply {
        message: completion.content,
        conversation_id,
        model: Some(state.backend.model_name().to_string()),
        tokens: completion.total_tokens,
        ..ChatReply::default()
    }))
}

/// Image URL for a prompt. No provider call is made.
async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ImageReply>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }
    let size = request.size.as_deref().unwrap_or(DEFAULT_IMAGE_SIZE);
    let image_url = pollinations_url(&request.prompt, size, state.clock.now_millis());
    info!(%image_url, "image url generated");

    Ok(Json(ImageReply {
        image_url,
        revised_prompt: request.prompt.clone(),
        prompt: request.prompt,
        model: IMAGE_MODEL.to_string(),
    }))
}

fn presentation_system_prompt(topic: &str, slides: u32) -> String {
    format!(
        r#"You are an expert presentation designer. Create a professional presentation about: "{topic}".

Generate EXACTLY {slides} slides in JSON format with this structure:
{{
  "title": "Main Presentation Title",
  "slides": [
    {{ "type": "title", "title": "Presentation Title", "subtitle": "Brief subtitle" }},
    {{ "type": "content", "title": "Slide Title", "content": "Brief description", "bullets": ["Key point 1", "Key point 2", "Key point 3"] }}
  ]
}}

Rules:
- First slide MUST be type "title" with title and subtitle
- Other slides are type "content" with title, content, and 3-4 bullets
- Keep text concise and professional
- Respond ONLY with valid JSON, no other text"#
    )
}

/// Slide deck from the model. Unusable output and provider failures other
/// than a rejected key fall back to the fixed deck.
async fn generate_presentation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PresentationRequest>,
) -> Result<Json<PresentationReply>, ApiError> {
    let prompt = request.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }
    let template = request.template.unwrap_or_default();
    let slide_count = request.number_of_slides.unwrap_or(DEFAULT_SLIDE_COUNT);

    let result = state
        .backend
        .complete(CompletionRequest {
            system: presentation_system_prompt(&prompt, slide_count),
            user: format!("Create a {slide_count}-slide presentation about: {prompt}"),
            temperature: state.temperature,
            max_tokens: state.presentation_max_tokens,
        })
        .await;

    let (deck, generated_by) = match result {
        Ok(completion) => match Deck::from_model_output(&completion.content, &prompt) {
            Some(deck) => (deck, state.backend.model_name().to_string()),
            None => (Deck::fallback(&prompt), FALLBACK_GENERATOR.to_string()),
        },
        Err(err) if err.upstream_status() == Some(401) => {
            return Err(ApiError::from_studio("Presentation generation failed", &err));
        }
        Err(err) => {
            warn!(error = %err, "presentation generation failed, serving fallback deck");
            (Deck::fallback(&prompt), FALLBACK_GENERATOR.to_string())
        }
    };
    info!(slides = deck.slides.len(), %generated_by, "presentation generated");

    Ok(Json(PresentationReply {
        title: deck.title,
        slides: deck.slides,
        template,
        prompt,
        generated_by,
    }))
}

/// Placeholder clip; no video provider is wired in.
async fn generate_video(Json(request): Json<VideoRequest>) -> Result<Json<VideoReply>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }
    info!(prompt = %request.prompt, "serving demo video");
    Ok(Json(VideoReply {
        video_url: DEMO_VIDEO_URL.to_string(),
        prompt: request.prompt,
        duration: request.duration.unwrap_or(DEFAULT_VIDEO_DURATION),
        status: VIDEO_STATUS_DEMO.to_string(),
        message: Some("DEMO MODE: placeholder video generated".to_string()),
    }))
}

async fn video_status(Path(video_id): Path<String>) -> Json<VideoStatus> {
    Json(VideoStatus {
        video_id,
        status: "completed".to_string(),
        video_url: STATUS_VIDEO_URL.to_string(),
    })
}
