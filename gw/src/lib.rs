//! ATHEA Gateway - JSON front for the generative-AI provider
//!
//! The gateway accepts uploaded images and shooting parameters from the
//! studio client, builds the prompts, and relays them to the provider.
//!
//! # Modules
//!
//! - [`api`] - Routes, request/response bodies and the HTTP server
//! - [`llm`] - Provider client trait, Gemini implementation and mock
//! - [`prompts`] - Embedded prompt templates with directory overrides
//! - [`image`] - Data-URI parsing
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod api;
pub mod cli;
pub mod config;
pub mod image;
pub mod llm;
pub mod prompts;

pub use api::{ApiError, ApiState, router, serve};
pub use config::Config;
pub use llm::{GenAiClient, GenerateRequest, GenerateResponse, LlmError, MockGenAiClient};
