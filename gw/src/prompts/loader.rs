//! Prompt Loader
//!
//! Loads prompt templates from the override directory or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Context for the `shooting-plan` template
#[derive(Debug, Clone, Serialize)]
pub struct PlanPromptContext {
    pub context: String,
    pub model_style: String,
    pub has_closeup: bool,
    pub has_face: bool,
}

/// Context for the `pose-prompt` template
#[derive(Debug, Clone, Serialize)]
pub struct PosePromptContext {
    pub concept: String,
    pub pose_description: String,
    pub user_context: String,
}

/// Context for the `render-image` template
#[derive(Debug, Clone, Serialize)]
pub struct RenderPromptContext {
    pub json_prompt: String,
    pub size: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine (HTML escaping disabled)
    hbs: Handlebars<'static>,
    /// Override directory
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `dir` before the embedded defaults
    pub fn new(dir: Option<impl AsRef<Path>>) -> Self {
        let override_dir = dir.map(|d| d.as_ref().to_path_buf()).filter(|d| {
            let exists = d.is_dir();
            debug!(dir = ?d, %exists, "PromptLoader::new: checking override directory");
            exists
        });

        Self {
            hbs: Self::engine(),
            override_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; JSON prompts must reach the model verbatim
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    pub fn suggest_contexts(&self) -> Result<String> {
        self.load_template("suggest-contexts")
    }

    pub fn suggest_model_styles(&self) -> Result<String> {
        self.load_template("suggest-model-styles")
    }

    pub fn shooting_plan(&self, context: &PlanPromptContext) -> Result<String> {
        self.render("shooting-plan", context)
    }

    pub fn pose_prompt(&self, context: &PosePromptContext) -> Result<String> {
        self.render("pose-prompt", context)
    }

    pub fn render_image(&self, context: &RenderPromptContext) -> Result<String> {
        self.render("render-image", context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_shooting_plan_renders_fields() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader
            .shooting_plan(&PlanPromptContext {
                context: "Studio phông nền màu be".to_string(),
                model_style: "Người mẫu Hàn Quốc".to_string(),
                has_closeup: true,
                has_face: false,
            })
            .unwrap();

        assert!(prompt.contains("Shooting context: Studio phông nền màu be"));
        assert!(prompt.contains("Model style: Người mẫu Hàn Quốc"));
        assert!(prompt.contains("close-up"));
        assert!(!prompt.contains("face of the model"));
    }

    #[test]
    fn test_render_image_keeps_json_verbatim() {
        let loader = PromptLoader::embedded_only();
        let json = r#"{"pose":"hands in pockets","light":"<soft>"}"#;
        let prompt = loader
            .render_image(&RenderPromptContext {
                json_prompt: json.to_string(),
                size: "1K".to_string(),
            })
            .unwrap();
        assert!(prompt.contains(json));
    }

    #[test]
    fn test_override_directory_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("suggest-contexts.pmt"), "custom contexts prompt").unwrap();

        let loader = PromptLoader::new(Some(temp.path()));
        assert_eq!(loader.suggest_contexts().unwrap(), "custom contexts prompt");
        // Templates without an override fall back to embedded
        assert!(loader.suggest_model_styles().unwrap().contains("JSON array"));
    }

    #[test]
    fn test_missing_override_directory_ignored() {
        let loader = PromptLoader::new(Some("/nonexistent/athea/prompts"));
        assert!(loader.override_dir.is_none());
        assert!(loader.suggest_contexts().is_ok());
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
