//! Route handlers
//!
//! Each handler validates one request shape, calls the provider, and
//! answers with a JSON result or a structured [`ApiError`]. No handler lets
//! an error escape as a framework rejection.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use eyre::{Context, eyre};
use tracing::{debug, error, info};

use super::ApiState;
use super::error::ApiError;
use super::types::{
    ContextsResponse, ImageRequest, ImageResponse, PlanRequest, PoseRequest, PoseResponse, PromptRequest,
    RenderRequest, StylesResponse, TextResponse, non_empty, parse_body,
};
use crate::image;
use crate::llm::{GenerateRequest, GenerateResponse};
use crate::prompts::{PlanPromptContext, PosePromptContext, RenderPromptContext};

/// Minimum prompt length accepted by the text generation routes
pub const MIN_PROMPT_CHARS: usize = 5;

/// Headline for failures on the suggest-contexts route
const CONTEXTS_FAILED: &str = "Failed to generate contexts";

/// Headline for failures on the text and image generation routes
const GENERATION_FAILED: &str = "Gemini call failed";

/// Image size used when a render request does not name one
const DEFAULT_IMAGE_SIZE: &str = "1K";

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/suggest-contexts
pub async fn suggest_contexts(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ContextsResponse>, ApiError> {
    let body = body?;
    debug!(len = body.len(), "suggest_contexts: called");
    let req: ImageRequest = parse_body(&body);
    let image = non_empty(req.image_base64).ok_or_else(|| ApiError::bad_request("Missing imageBase64"))?;
    let provider = state.provider()?;

    let result = async {
        let prompt = state.prompts.suggest_contexts()?;
        let request = GenerateRequest::new(&state.models.suggest)
            .part(image::inline_part(&image))
            .text(prompt)
            .json_response();
        let response = provider.generate(request).await?;
        log_usage("suggest-contexts", &response);
        parse_string_array(response)
    }
    .await;

    match result {
        Ok(contexts) => {
            info!(count = contexts.len(), "suggest_contexts: success");
            Ok(Json(ContextsResponse { contexts }))
        }
        Err(e) => {
            error!(error = %e, "suggest-contexts error");
            Err(ApiError::upstream(CONTEXTS_FAILED, e))
        }
    }
}

/// POST /api/suggest-model-styles
pub async fn suggest_model_styles(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<StylesResponse>, ApiError> {
    let body = body?;
    debug!(len = body.len(), "suggest_model_styles: called");
    let req: ImageRequest = parse_body(&body);
    let image = non_empty(req.image_base64).ok_or_else(|| ApiError::bad_request("Missing imageBase64"))?;
    let provider = state.provider()?;

    let result = async {
        let prompt = state.prompts.suggest_model_styles()?;
        let request = GenerateRequest::new(&state.models.suggest)
            .part(image::inline_part(&image))
            .text(prompt)
            .json_response();
        let response = provider.generate(request).await?;
        log_usage("suggest-model-styles", &response);
        parse_string_array(response)
    }
    .await;

    match result {
        Ok(styles) => {
            info!(count = styles.len(), "suggest_model_styles: success");
            Ok(Json(StylesResponse { styles }))
        }
        Err(e) => {
            error!(error = %e, "suggest-model-styles error");
            Err(ApiError::upstream_message(e))
        }
    }
}

/// POST /api/generate
///
/// Plain text generation from a caller-supplied prompt.
pub async fn generate(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TextResponse>, ApiError> {
    let body = body?;
    debug!(len = body.len(), "generate: called");
    let provider = state.provider()?;
    let req: PromptRequest = parse_body(&body);
    let prompt = validate_prompt(req.prompt)?;

    let request = GenerateRequest::new(&state.models.plan).text(prompt);
    match provider.generate(request).await {
        Ok(response) => {
            log_usage("generate", &response);
            Ok(Json(TextResponse {
                text: response.text.unwrap_or_default(),
            }))
        }
        Err(e) => {
            error!(error = %e, "generate error");
            Err(ApiError::upstream(GENERATION_FAILED, e))
        }
    }
}

/// POST /api/generate-shooting-plan
pub async fn generate_shooting_plan(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TextResponse>, ApiError> {
    let body = body?;
    debug!(len = body.len(), "generate_shooting_plan: called");
    let provider = state.provider()?;
    let req: PlanRequest = parse_body(&body);

    let image = non_empty(req.image_base64);
    let closeup = non_empty(req.closeup_image_base64);
    let face = non_empty(req.face_image_base64);

    let prompt = match req.prompt {
        Some(prompt) => {
            debug!("generate_shooting_plan: caller supplied prompt");
            validate_prompt(Some(prompt))?
        }
        None => {
            let image = image.as_ref().ok_or_else(|| ApiError::bad_request("Missing imageBase64"))?;
            debug!(image_len = image.len(), "generate_shooting_plan: rendering plan prompt");
            let context = non_empty(req.context).ok_or_else(|| ApiError::bad_request("Missing context"))?;
            let model_style = non_empty(req.model_style).ok_or_else(|| ApiError::bad_request("Missing modelStyle"))?;
            let rendered = state
                .prompts
                .shooting_plan(&PlanPromptContext {
                    context,
                    model_style,
                    has_closeup: closeup.is_some(),
                    has_face: face.is_some(),
                })
                .map_err(|e| ApiError::upstream(GENERATION_FAILED, e))?;
            validate_prompt(Some(rendered))?
        }
    };

    let mut request = GenerateRequest::new(&state.models.plan);
    for uri in [&image, &closeup, &face].into_iter().flatten() {
        request = request.part(image::inline_part(uri));
    }
    let request = request.text(prompt);

    match provider.generate(request).await {
        Ok(response) => {
            log_usage("generate-shooting-plan", &response);
            let text = response.text.unwrap_or_default();
            info!(len = text.len(), "generate_shooting_plan: success");
            Ok(Json(TextResponse { text }))
        }
        Err(e) => {
            error!(error = %e, "generate-shooting-plan error");
            Err(ApiError::upstream(GENERATION_FAILED, e))
        }
    }
}

/// POST /api/generate-pose-prompt
pub async fn generate_pose_prompt(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PoseResponse>, ApiError> {
    let body = body?;
    debug!(len = body.len(), "generate_pose_prompt: called");
    let req: PoseRequest = parse_body(&body);
    let image = non_empty(req.image_base64).ok_or_else(|| ApiError::bad_request("Missing imageBase64"))?;
    let concept = non_empty(req.concept).ok_or_else(|| ApiError::bad_request("Missing concept"))?;
    let pose_description =
        non_empty(req.pose_description).ok_or_else(|| ApiError::bad_request("Missing poseDescription"))?;
    let user_context = req.user_context.unwrap_or_default();
    let provider = state.provider()?;

    let result = async {
        let prompt = state.prompts.pose_prompt(&PosePromptContext {
            concept,
            pose_description,
            user_context,
        })?;
        let request = GenerateRequest::new(&state.models.pose)
            .part(image::inline_part(&image))
            .text(prompt)
            .json_response();
        let response = provider.generate(request).await?;
        log_usage("generate-pose-prompt", &response);
        let text = response.text.unwrap_or_default();
        let json = text.trim();
        serde_json::from_str::<serde_json::Value>(json).context("Model did not return valid JSON")?;
        Ok::<_, eyre::Report>(json.to_string())
    }
    .await;

    match result {
        Ok(json) => Ok(Json(PoseResponse { json })),
        Err(e) => {
            error!(error = %e, "generate-pose-prompt error");
            Err(ApiError::upstream(GENERATION_FAILED, e))
        }
    }
}

/// POST /api/generate-image
pub async fn generate_image(
    State(state): State<Arc<ApiState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ImageResponse>, ApiError> {
    let body = body?;
    debug!(len = body.len(), "generate_image: called");
    let req: RenderRequest = parse_body(&body);
    let image = non_empty(req.image_base64).ok_or_else(|| ApiError::bad_request("Missing imageBase64"))?;
    let json_prompt = non_empty(req.json_prompt).ok_or_else(|| ApiError::bad_request("Missing jsonPrompt"))?;
    let size = non_empty(req.size).unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string());
    let provider = state.provider()?;

    let result = async {
        let prompt = state.prompts.render_image(&RenderPromptContext {
            json_prompt,
            size: size.clone(),
        })?;
        let request = GenerateRequest::new(&state.models.image)
            .part(image::inline_part(&image))
            .text(prompt)
            .image_size(size);
        let response = provider.generate(request).await?;
        log_usage("generate-image", &response);
        match response.images.first() {
            Some(img) => Ok(img.data.clone()),
            None => Err(missing_content("image", &response)),
        }
    }
    .await;

    match result {
        Ok(base64) => {
            info!(len = base64.len(), "generate_image: success");
            Ok(Json(ImageResponse { base64 }))
        }
        Err(e) => {
            error!(error = %e, "generate-image error");
            Err(ApiError::upstream(GENERATION_FAILED, e))
        }
    }
}

/// Accept a prompt only if it is a string of at least [`MIN_PROMPT_CHARS`] characters
fn validate_prompt(prompt: Option<String>) -> Result<String, ApiError> {
    match prompt {
        Some(p) if p.chars().count() >= MIN_PROMPT_CHARS => Ok(p),
        _ => Err(ApiError::bad_request("Invalid prompt")),
    }
}

/// Parse the model's answer as a bare JSON array of strings
fn parse_string_array(response: GenerateResponse) -> eyre::Result<Vec<String>> {
    let Some(text) = response.text.as_deref() else {
        return Err(missing_content("text", &response));
    };
    let items: Vec<String> = serde_json::from_str(text.trim()).context("Model answer is not a JSON array of strings")?;
    Ok(items)
}

fn log_usage(route: &str, response: &GenerateResponse) {
    info!(
        %route,
        prompt_tokens = response.usage.prompt_tokens,
        output_tokens = response.usage.output_tokens,
        finish_reason = response.finish_reason.as_deref().unwrap_or("-"),
        "Provider call complete"
    );
}

/// Error for an answer lacking the expected content, naming why the model stopped
fn missing_content(what: &str, response: &GenerateResponse) -> eyre::Report {
    match &response.finish_reason {
        Some(reason) => eyre!("Provider returned no {} (finish reason: {})", what, reason),
        None => eyre!("Provider returned no {}", what),
    }
}
