//! Prompt Template System
//!
//! Template loading chain:
//! 1. `{prompts.dir}/{name}.pmt` (configured override directory)
//! 2. Embedded default compiled from `gw/prompts/`
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PlanPromptContext, PosePromptContext, PromptLoader, RenderPromptContext};
