//! Generative-AI provider client
//!
//! Provides the provider-agnostic request/response types, the
//! [`GenAiClient`] trait, and the Gemini implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::GenAiClient;
pub use client::mock::MockGenAiClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{GenerateRequest, GenerateResponse, InlineImage, Part, TokenUsage};

use crate::config::LlmConfig;

/// Create a provider client based on the provider specified in config
///
/// Reads the credential from the configured environment variable. Only the
/// "gemini" provider is supported.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn GenAiClient>, LlmError> {
    debug!(provider = %config.provider, "create_client: called");
    let api_key = config.get_api_key()?;

    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config, api_key)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown provider: '{}'. Supported: gemini",
                other
            )))
        }
    }
}
