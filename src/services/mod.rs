//! Generation services the editors call.

pub mod http;

use async_trait::async_trait;

use crate::api::{
    ChatReply, ChatRequest, ImageReply, ImageRequest, PresentationReply, PresentationRequest,
    VideoReply, VideoRequest,
};
use crate::common::errors::StudioResult;

pub use http::HttpGenerationService;

/// Chat, image, presentation and video generation endpoints.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Send one chat message.
    ///
    /// # Errors
    /// Returns an error if the request fails or the service rejects it.
    async fn chat(&self, request: ChatRequest) -> StudioResult<ChatReply>;

    /// Generate an image.
    ///
    /// # Errors
    /// Returns an error if the request fails or the service rejects it.
    async fn generate_image(&self, request: ImageRequest) -> StudioResult<ImageReply>;

    /// Generate a slide deck.
    ///
    /// # Errors
    /// Returns an error if the request fails or the service rejects it.
    async fn generate_presentation(
        &self,
        request: PresentationRequest,
    ) -> StudioResult<PresentationReply>;

    /// Generate a video.
    ///
    /// # Errors
    /// Returns an error if the request fails or the service rejects it.
    async fn generate_video(&self, request: VideoRequest) -> StudioResult<VideoReply>;
}
