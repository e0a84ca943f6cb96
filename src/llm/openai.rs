//! OpenAI-compatible chat completions (Groq or OpenAI).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::common::config::ProviderConfig;
use crate::common::errors::{StudioError, StudioResult};
use crate::llm::{Completion, CompletionBackend, CompletionRequest};

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client of an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatClient {
    /// Build a client for `config`. A missing API key is accepted here and
    /// reported on the first request.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> StudioResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let base_url = config.base_url().trim_end_matches('/').to_string();
        let model = config.model();
        info!(provider = ?config.provider, %base_url, %model, "completion client ready");
        if config.api_key.is_none() {
            warn!(provider = ?config.provider, "no API key configured; completions will fail");
        }
        Ok(Self {
            client,
            base_url,
            model,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatClient {
    async fn complete(&self, request: CompletionRequest) -> StudioResult<Completion> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(StudioError::InvalidConfig(
                "API key for the AI provider is not set".to_string(),
            ));
        };

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        debug!(model = %self.model, prompt_len = request.user.len(), "requesting completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            warn!(status = status.as_u16(), %message, "completion rejected");
            return Err(StudioError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!(len = content.len(), "completion received");

        Ok(Completion {
            content,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            total_tokens: parsed.usage.map(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            base_url: Some(format!("{}/v1/", server.uri())),
            api_key: key.map(str::to_string),
            ..ProviderConfig::default()
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "be brief".to_string(),
            user: "hello".to_string(),
            temperature: 0.7,
            max_tokens: 1_000,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": "llama-3.3-70b-versatile",
                "max_tokens": 1000,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama-3.3-70b-versatile",
                "choices": [{"message": {"role": "assistant", "content": "hi there"}}],
                "usage": {"total_tokens": 12}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config(&server, Some("gsk_test"))).unwrap();
        let completion = client.complete(request()).await.unwrap();
        assert_eq!(completion.content, "hi there");
        assert_eq!(completion.total_tokens, Some(12));
        assert_eq!(client.model_name(), "llama-3.3-70b-versatile");
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"error": {"message": "slow down"}})),
            )
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config(&server, Some("k"))).unwrap();
        let err = client.complete(request()).await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(429));
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OpenAiCompatClient::new(&config(&server, None)).unwrap();
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, StudioError::InvalidConfig(_)));
    }
}
