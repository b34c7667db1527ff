//! The shooting-plan state snapshot

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output size for rendered pose images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    Size1K,
    #[serde(rename = "2K")]
    Size2K,
    #[serde(rename = "4K")]
    Size4K,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Size1K => "1K",
            ImageSize::Size2K => "2K",
            ImageSize::Size4K => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1K" => Ok(ImageSize::Size1K),
            "2K" => Ok(ImageSize::Size2K),
            "4K" => Ok(ImageSize::Size4K),
            other => Err(format!("Unknown image size '{}'. Expected 1K, 2K or 4K", other)),
        }
    }
}

/// Everything the presentation layer renders
///
/// Replaced as a whole on every transition, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootingPlanState {
    pub image: Option<String>,
    pub closeup_image: Option<String>,
    pub face_image: Option<String>,
    pub context: String,
    pub model_style: String,
    pub plan_result: Option<String>,
    pub is_loading_plan: bool,
    pub generated_image: Option<String>,
    pub is_generating_image: bool,
    pub image_size: ImageSize,
    pub error: Option<String>,
    pub suggested_contexts: Vec<String>,
    pub is_suggesting_contexts: bool,
    pub suggested_model_styles: Vec<String>,
    pub is_suggesting_model_styles: bool,
    pub pose_prompts: BTreeMap<String, String>,
    pub generating_pose_prompt_id: Option<String>,
    pub pose_images: BTreeMap<String, String>,
    pub generating_pose_image_id: Option<String>,

    /// Bumped by every upload; suggestion replies for older uploads are dropped
    pub upload_generation: u64,
    /// Bumped by every plan request; older plan replies are dropped
    pub plan_generation: u64,
}

impl ShootingPlanState {
    /// Whether a plan can be requested
    pub fn can_generate_plan(&self) -> bool {
        self.image.is_some() && !self.context.is_empty() && !self.model_style.is_empty()
    }
}
