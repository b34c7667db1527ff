//! Gemini API client implementation
//!
//! Implements the GenAiClient trait for Google's `generateContent` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{GenAiClient, GenerateRequest, GenerateResponse, InlineImage, LlmError, Part, TokenUsage};
use crate::config::LlmConfig;

/// Gemini API client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client from configuration and an already-resolved API key
    pub fn from_config(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        debug!(base_url = %config.base_url, timeout_ms = %config.timeout_ms, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &GenerateRequest) -> serde_json::Value {
        debug!(model = %request.model, part_count = %request.parts.len(), "build_request_body: called");
        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": request.parts,
            }],
        });

        let mut generation_config = serde_json::Map::new();
        if let Some(ref mime) = request.response_mime_type {
            debug!(%mime, "build_request_body: response mime type set");
            generation_config.insert("responseMimeType".to_string(), serde_json::json!(mime));
        }
        if let Some(ref size) = request.image_size {
            debug!(%size, "build_request_body: image size set");
            generation_config.insert("responseModalities".to_string(), serde_json::json!(["IMAGE"]));
            generation_config.insert("imageConfig".to_string(), serde_json::json!({ "imageSize": size }));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    /// Parse the Gemini API response
    fn parse_response(&self, api_response: GeminiResponse) -> Result<GenerateResponse, LlmError> {
        debug!(candidate_count = %api_response.candidates.len(), "parse_response: called");
        let Some(candidate) = api_response.candidates.into_iter().next() else {
            let reason = api_response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            debug!(%reason, "parse_response: empty candidate list");
            return Err(LlmError::InvalidResponse(format!("Provider returned no content ({})", reason)));
        };

        let mut text = String::new();
        let mut images = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(data) = part.inline_data {
                images.push(data);
            }
        }

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(GenerateResponse {
            text: if text.is_empty() { None } else { Some(text) },
            images,
            finish_reason: candidate.finish_reason,
            usage,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            debug!("map_send_error: request timed out");
            LlmError::Timeout(self.timeout)
        } else {
            debug!(error = %e, "map_send_error: network error");
            LlmError::Network(e)
        }
    }
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        debug!(model = %request.model, images = %request.image_count(), "generate: called");
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, request.model);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.api_key.clone())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, "generate: API error");
            return Err(LlmError::ApiError {
                status,
                message: provider_error_message(&text),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        let api_response: GeminiResponse = serde_json::from_slice(&bytes)?;
        debug!("generate: success");
        self.parse_response(api_response)
    }
}

/// Extract `error.message` from a provider error body, falling back to the raw text
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string())
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<InlineImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: Option<String>,
}
