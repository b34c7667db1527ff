//! Backend client error types

use thiserror::Error;

/// Errors surfaced by the backend client
///
/// `Api` displays as the server's message alone, so the orchestrator can
/// show it to the user unchanged.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// HTTP status for server-reported failures
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
