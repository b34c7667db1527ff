//! Backend client for the gateway routes
//!
//! [`BackendClient`] turns typed requests into JSON POSTs and normalizes
//! every failure into a [`BackendError`]. The orchestrator only sees the
//! [`StudioBackend`] trait.

pub mod client;
mod error;
mod http;
mod types;

pub use client::StudioBackend;
pub use client::mock::{BackendCall, MockBackend, api_error};
pub use error::BackendError;
pub use http::{BackendClient, GENERIC_FAILURE};
pub use types::{ImageBody, PlanParams, PoseParams, RenderParams};
