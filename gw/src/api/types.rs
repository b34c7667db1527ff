//! Request and response bodies for the gateway routes
//!
//! Request fields are all optional so validation can answer with a precise
//! 400 message instead of a deserialization rejection.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parse a request body, treating anything unparsable as an empty body
pub fn parse_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    match serde_json::from_slice(bytes) {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, len = bytes.len(), "parse_body: unparsable body, using empty");
            T::default()
        }
    }
}

/// Body of both suggestion routes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageRequest {
    pub image_base64: Option<String>,
}

/// Body of `/api/generate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptRequest {
    pub prompt: Option<String>,
}

/// Body of `/api/generate-shooting-plan`
///
/// Either a ready `prompt`, or the image plus context and model style from
/// which the plan prompt is rendered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanRequest {
    pub prompt: Option<String>,
    pub image_base64: Option<String>,
    pub context: Option<String>,
    pub model_style: Option<String>,
    pub closeup_image_base64: Option<String>,
    pub face_image_base64: Option<String>,
}

/// Body of `/api/generate-pose-prompt`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoseRequest {
    pub image_base64: Option<String>,
    pub concept: Option<String>,
    pub pose_description: Option<String>,
    pub user_context: Option<String>,
}

/// Body of `/api/generate-image`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderRequest {
    pub image_base64: Option<String>,
    pub json_prompt: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextsResponse {
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesResponse {
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseResponse {
    pub json: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub base64: String,
}

/// Keep a field only if it is present and not the empty string
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
