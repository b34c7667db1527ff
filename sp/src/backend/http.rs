//! HTTP implementation of the StudioBackend trait

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::types::{ContextsReply, ImageBody, ImageReply, PoseReply, StylesReply, TextReply};
use super::{BackendError, PlanParams, PoseParams, RenderParams, StudioBackend};

/// Fallback message when a failed response names no error
pub const GENERIC_FAILURE: &str = "API request failed";

/// JSON client for the gateway routes
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    /// Create a client for the gateway at `base_url` (e.g. "http://127.0.0.1:3000")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "BackendClient::new: called");
        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` as JSON to `path` and decode the reply as `T`
    ///
    /// An unparsable reply body is read as `{}`. A non-2xx status fails with
    /// the body's `error` field, else its `detail` field, else
    /// [`GENERIC_FAILURE`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "post_json: called");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let data: Value = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            debug!(error = %e, len = bytes.len(), "post_json: unparsable body, using {{}}");
            Value::Object(Default::default())
        });

        if !status.is_success() {
            let message = failure_message(&data);
            debug!(status = %status.as_u16(), %message, "post_json: request failed");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_value(data)?)
    }
}

/// Pick the message of a failed response
fn failure_message(data: &Value) -> String {
    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    field("error")
        .or_else(|| field("detail"))
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[async_trait]
impl StudioBackend for BackendClient {
    async fn suggest_shooting_contexts(&self, image_base64: &str) -> Result<Vec<String>, BackendError> {
        debug!(len = image_base64.len(), "suggest_shooting_contexts: called");
        let reply: ContextsReply = self
            .post_json("/api/suggest-contexts", &ImageBody { image_base64 })
            .await?;
        Ok(reply.contexts)
    }

    async fn suggest_model_styles(&self, image_base64: &str) -> Result<Vec<String>, BackendError> {
        debug!(len = image_base64.len(), "suggest_model_styles: called");
        let reply: StylesReply = self
            .post_json("/api/suggest-model-styles", &ImageBody { image_base64 })
            .await?;
        Ok(reply.styles)
    }

    async fn generate_shooting_plan(&self, params: PlanParams) -> Result<String, BackendError> {
        debug!(context = %params.context, model_style = %params.model_style, "generate_shooting_plan: called");
        let reply: TextReply = self.post_json("/api/generate-shooting-plan", &params).await?;
        Ok(reply.text)
    }

    async fn generate_pose_prompt(&self, params: PoseParams) -> Result<String, BackendError> {
        debug!(concept = %params.concept, "generate_pose_prompt: called");
        let reply: PoseReply = self.post_json("/api/generate-pose-prompt", &params).await?;
        Ok(reply.json)
    }

    async fn generate_image_from_json_prompt(&self, params: RenderParams) -> Result<String, BackendError> {
        debug!(size = %params.size, "generate_image_from_json_prompt: called");
        let reply: ImageReply = self.post_json("/api/generate-image", &params).await?;
        Ok(format!("data:image/png;base64,{}", reply.base64))
    }
}
