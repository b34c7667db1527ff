//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Shooting-context suggestions for a product photo
pub const SUGGEST_CONTEXTS: &str = include_str!("../../prompts/suggest-contexts.pmt");

/// Model-style suggestions for a product photo
pub const SUGGEST_MODEL_STYLES: &str = include_str!("../../prompts/suggest-model-styles.pmt");

/// Full shooting plan from context and model style
pub const SHOOTING_PLAN: &str = include_str!("../../prompts/shooting-plan.pmt");

/// Structured JSON description of a single pose
pub const POSE_PROMPT: &str = include_str!("../../prompts/pose-prompt.pmt");

/// Image rendering from a JSON pose prompt
pub const RENDER_IMAGE: &str = include_str!("../../prompts/render-image.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "suggest-contexts" => Some(SUGGEST_CONTEXTS),
        "suggest-model-styles" => Some(SUGGEST_MODEL_STYLES),
        "shooting-plan" => Some(SHOOTING_PLAN),
        "pose-prompt" => Some(POSE_PROMPT),
        "render-image" => Some(RENDER_IMAGE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
