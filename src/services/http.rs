//! reqwest client of the studio backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::api::{
    ChatReply, ChatRequest, ErrorBody, ImageReply, ImageRequest, PresentationReply,
    PresentationRequest, VideoReply, VideoRequest,
};
use crate::common::errors::{StudioError, StudioResult};
use crate::services::GenerationService;

/// Client for the `/api/*` generation routes.
#[derive(Clone, Debug)]
pub struct HttpGenerationService {
    client: Client,
    base_url: String,
}

impl HttpGenerationService {
    /// Client for the API rooted at `base_url` (for example
    /// `http://127.0.0.1:5000/api`).
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> StudioResult<Self> {
        Url::parse(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> StudioResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(%url, "calling generation endpoint");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_else(|_| ErrorBody {
                error: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
                details: None,
            });
            warn!(%url, status = status.as_u16(), error = %body.error, "generation endpoint failed");
            return Err(StudioError::Upstream {
                status: status.as_u16(),
                message: body.details.map_or(body.error.clone(), |d| format!("{}: {d}", body.error)),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn chat(&self, request: ChatRequest) -> StudioResult<ChatReply> {
        self.post("/chat", &request).await
    }

    async fn generate_image(&self, request: ImageRequest) -> StudioResult<ImageReply> {
        self.post("/image/generate", &request).await
    }

    async fn generate_presentation(
        &self,
        request: PresentationRequest,
    ) -> StudioResult<PresentationReply> {
        self.post("/presentation/generate", &request).await
    }

    async fn generate_video(&self, request: VideoRequest) -> StudioResult<VideoReply> {
        self.post("/video/generate", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ids::ArtifactId;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service(server: &MockServer) -> HttpGenerationService {
        HttpGenerationService::new(&format!("{}/api/", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_posts_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(serde_json::json!({"message": "hi", "conversationId": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "hello!",
                "conversationId": 5,
                "model": "llama-3.3-70b-versatile",
                "tokens": 9
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = service(&server)
            .await
            .chat(ChatRequest {
                message: "hi".to_string(),
                conversation_id: Some(ArtifactId::from_millis(5)),
            })
            .await
            .unwrap();
        assert_eq!(reply.message, "hello!");
        assert_eq!(reply.tokens, Some(9));
    }

    #[tokio::test]
    async fn test_error_body_becomes_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/video/generate"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": "Rate limit exceeded"
            })))
            .mount(&server)
            .await;

        let err = service(&server)
            .await
            .generate_video(VideoRequest {
                prompt: "waves".to_string(),
                duration: Some(5),
            })
            .await
            .unwrap_err();
        assert_eq!(err.upstream_status(), Some(429));
        assert!(err.to_string().contains("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/image/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = service(&server)
            .await
            .generate_image(ImageRequest {
                prompt: "cat".to_string(),
                ..ImageRequest::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.upstream_status(), Some(500));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpGenerationService::new("not a url", Duration::from_secs(1)).is_err());
    }
}
