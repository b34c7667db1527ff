//! ATHEA Studio - shooting-plan orchestration
//!
//! Drives the upload -> suggestion -> plan workflow against the gateway and
//! keeps the state snapshot a presentation layer renders.
//!
//! # Modules
//!
//! - [`orchestrator`] - State owner and workflow sequencing
//! - [`backend`] - Typed JSON client for the gateway routes
//! - [`state`] - The state snapshot
//! - [`session`] - Signed-in user and its storage
//! - [`reporter`] - Sink for silently degraded errors
//! - [`image`] - Image files to data URIs
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod backend;
pub mod cli;
pub mod config;
pub mod image;
pub mod orchestrator;
pub mod reporter;
pub mod session;
pub mod state;

pub use backend::{BackendClient, BackendError, StudioBackend};
pub use orchestrator::Orchestrator;
pub use session::{FileSessionStore, SessionStore, User};
pub use state::{ImageSize, ShootingPlanState};
