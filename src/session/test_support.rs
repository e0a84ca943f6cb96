//! In-process generation service for editor tests.

use async_trait::async_trait;

use crate::api::{
    ChatReply, ChatRequest, ImageReply, ImageRequest, PresentationReply, PresentationRequest,
    VIDEO_STATUS_DEMO, VideoReply, VideoRequest,
};
use crate::artifacts::Slide;
use crate::common::errors::{StudioError, StudioResult};
use crate::services::GenerationService;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Ok,
    Demo,
    Failing,
}

/// Answers every request locally, or fails every request.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StubService {
    mode: Mode,
}

impl StubService {
    pub(crate) const fn failing() -> Self {
        Self { mode: Mode::Failing }
    }

    /// Videos come back as placeholders.
    pub(crate) const fn demo() -> Self {
        Self { mode: Mode::Demo }
    }

    fn check(self) -> StudioResult<()> {
        match self.mode {
            Mode::Failing => Err(StudioError::Upstream {
                status: 500,
                message: "stub failure".to_string(),
            }),
            Mode::Ok | Mode::Demo => Ok(()),
        }
    }
}

#[async_trait]
impl GenerationService for StubService {
    async fn chat(&self, request: ChatRequest) -> StudioResult<ChatReply> {
        self.check()?;
        Ok(ChatReply {
            message: format!("echo: {}", request.message),
            conversation_id: request.conversation_id.unwrap_or_default(),
            model: Some("stub".to_string()),
            ..ChatReply::default()
        })
    }

    async fn generate_image(&self, request: ImageRequest) -> StudioResult<ImageReply> {
        self.check()?;
        Ok(ImageReply {
            image_url: format!("https://images.test/{}.png", request.prompt.replace(' ', "-")),
            prompt: request.prompt,
            model: "stub".to_string(),
            revised_prompt: String::new(),
        })
    }

    async fn generate_presentation(
        &self,
        request: PresentationRequest,
    ) -> StudioResult<PresentationReply> {
        self.check()?;
        Ok(PresentationReply {
            title: request.prompt.clone(),
            slides: vec![
                Slide::title(request.prompt.clone(), "Overview"),
                Slide::content("Agenda", "What we cover", ["Context", "Plan"]),
            ],
            template: request.template.unwrap_or_default(),
            prompt: request.prompt,
            generated_by: "stub".to_string(),
        })
    }

    async fn generate_video(&self, request: VideoRequest) -> StudioResult<VideoReply> {
        self.check()?;
        let status = if self.mode == Mode::Demo {
            VIDEO_STATUS_DEMO
        } else {
            "completed"
        };
        Ok(VideoReply {
            video_url: "https://videos.test/clip.mp4".to_string(),
            prompt: request.prompt,
            duration: request.duration.unwrap_or(5),
            status: status.to_string(),
            message: None,
        })
    }
}
