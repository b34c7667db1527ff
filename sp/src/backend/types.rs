//! Wire types shared with the gateway routes

use serde::{Deserialize, Serialize};

/// Body of both suggestion requests
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody<'a> {
    pub image_base64: &'a str,
}

/// Shooting-plan request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParams {
    pub image_base64: String,
    pub context: String,
    pub model_style: String,
    pub closeup_image_base64: Option<String>,
    pub face_image_base64: Option<String>,
}

/// Pose-prompt request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseParams {
    pub image_base64: String,
    pub concept: String,
    pub pose_description: String,
    pub user_context: String,
}

/// Image-render request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    pub image_base64: String,
    pub json_prompt: String,
    pub size: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContextsReply {
    #[serde(default)]
    pub contexts: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StylesReply {
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextReply {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PoseReply {
    pub json: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageReply {
    pub base64: String,
}
