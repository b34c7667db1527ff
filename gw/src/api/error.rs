//! API error type and its JSON rendering

use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors returned by gateway routes
///
/// Every variant renders as `{ "error": ..., "detail"?: ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request field (400)
    #[error("{0}")]
    BadRequest(String),

    /// Provider credential not configured (500)
    #[error("Missing {0}")]
    MissingCredential(String),

    /// Provider call or response handling failed (500)
    #[error("{error}")]
    Upstream { error: String, detail: Option<String> },

    /// Route exists but not for this method (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body larger than the configured limit (413)
    #[error("Request body too large")]
    PayloadTooLarge,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Provider failure with a fixed headline and the underlying error as detail
    pub fn upstream(error: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Upstream {
            error: error.into(),
            detail: Some(detail.to_string()),
        }
    }

    /// Provider failure reported by its own message only
    pub fn upstream_message(error: impl ToString) -> Self {
        ApiError::Upstream {
            error: error.to_string(),
            detail: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingCredential(_) | ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let detail = match self {
            ApiError::Upstream { detail, .. } => detail.clone(),
            _ => None,
        };
        ErrorBody {
            error: self.to_string(),
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(%status, error = %self, "ApiError::into_response: called");
        (status, Json(self.body())).into_response()
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        debug!(status = %rejection.status(), "ApiError::from: body rejected");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

/// JSON error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Fallback for any method other than POST on a POST-only route
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
