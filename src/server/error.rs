//! JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::ErrorBody;
use crate::common::errors::StudioError;

/// Error returned by a handler, rendered as `{"error", "details"?}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// 400 with `message`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                details: None,
            },
        }
    }

    /// Map a failure of the operation described by `context`. Provider
    /// authentication and rate-limit failures keep their status; everything
    /// else is a 500 carrying the cause as `details`.
    #[must_use]
    pub fn from_studio(context: &str, err: &StudioError) -> Self {
        let (status, message, details) = match err.upstream_status() {
            Some(401) => (
                StatusCode::UNAUTHORIZED,
                "Invalid API key. Please check your AI provider configuration.".to_string(),
                None,
            ),
            Some(429) => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.".to_string(),
                None,
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                context.to_string(),
                Some(err.to_string()),
            ),
        };
        error!(%status, error = %err, "{context}");
        Self {
            status,
            body: ErrorBody {
                error: message,
                details,
            },
        }
    }

    /// HTTP status sent with the body.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unauthorized = StudioError::Upstream {
            status: 401,
            message: "bad key".to_string(),
        };
        assert_eq!(
            ApiError::from_studio("chat failed", &unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );

        let limited = StudioError::Upstream {
            status: 429,
            message: "slow".to_string(),
        };
        assert_eq!(
            ApiError::from_studio("chat failed", &limited).status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        let missing_key = StudioError::InvalidConfig("no key".to_string());
        let err = ApiError::from_studio("Failed to process chat message", &missing_key);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Failed to process chat message");
        assert!(err.body.details.unwrap().contains("no key"));
    }
}
