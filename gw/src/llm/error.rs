//! Provider error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while calling the generative-AI provider
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing {0}")]
    MissingCredential(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Check if this error comes from configuration rather than the provider
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingCredential(_))
    }

    /// HTTP status reported by the provider, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_display() {
        let err = LlmError::MissingCredential("GEMINI_API_KEY".to_string());
        assert_eq!(err.to_string(), "Missing GEMINI_API_KEY");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_api_error_display_and_status() {
        let err = LlmError::ApiError {
            status: 403,
            message: "API key not valid".to_string(),
        };
        assert_eq!(err.to_string(), "API error 403: API key not valid");
        assert_eq!(err.status(), Some(403));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_status_absent_for_non_api_errors() {
        assert_eq!(LlmError::InvalidResponse("empty".to_string()).status(), None);
        assert_eq!(LlmError::Timeout(Duration::from_secs(30)).status(), None);
    }
}
