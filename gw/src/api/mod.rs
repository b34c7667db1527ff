//! HTTP surface of the gateway
//!
//! Exposes the JSON routes used by the studio client and the browser UI.
//! Each POST-only route answers 405 for other methods.

use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{Instrument, debug, info, info_span, warn};

pub mod error;
pub mod handlers;
pub mod types;

pub use error::{ApiError, ErrorBody};

use crate::config::{Config, ModelsConfig};
use crate::llm::{self, GenAiClient, LlmError};
use crate::prompts::PromptLoader;

/// Request body limit used unless configured otherwise
///
/// Sized for a plan request carrying three multi-megabyte photos as base64.
pub const DEFAULT_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Shared state handed to every route
pub struct ApiState {
    /// Provider client; `None` when the credential was not configured
    provider: Option<Arc<dyn GenAiClient>>,
    /// Name of the credential variable, reported when it is missing
    credential_env: String,
    pub models: ModelsConfig,
    pub prompts: PromptLoader,
    /// Largest accepted request body in bytes
    body_limit: usize,
}

impl ApiState {
    pub fn new(
        provider: Option<Arc<dyn GenAiClient>>,
        credential_env: impl Into<String>,
        models: ModelsConfig,
        prompts: PromptLoader,
    ) -> Self {
        Self {
            provider,
            credential_env: credential_env.into(),
            models,
            prompts,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Build state from configuration
    ///
    /// A missing credential leaves the provider unset instead of failing, so
    /// the server still starts.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        debug!("ApiState::from_config: called");
        let provider = match llm::create_client(&config.llm) {
            Ok(client) => Some(client),
            Err(LlmError::MissingCredential(var)) => {
                warn!(%var, "Provider credential not set, generation routes will fail");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self::new(
            provider,
            config.llm.api_key_env.clone(),
            config.llm.models.clone(),
            PromptLoader::new(config.prompts.dir.as_ref()),
        )
        .with_body_limit(config.server.body_limit_bytes()))
    }

    /// The provider client, or the missing-credential error
    pub fn provider(&self) -> Result<&Arc<dyn GenAiClient>, ApiError> {
        self.provider
            .as_ref()
            .ok_or_else(|| ApiError::MissingCredential(self.credential_env.clone()))
    }
}

/// Build the gateway router
pub fn router(state: Arc<ApiState>) -> Router {
    let body_limit = state.body_limit();
    debug!(%body_limit, "router: called");
    Router::new()
        .route(
            "/api/suggest-contexts",
            post(handlers::suggest_contexts).fallback(error::method_not_allowed),
        )
        .route(
            "/api/suggest-model-styles",
            post(handlers::suggest_model_styles).fallback(error::method_not_allowed),
        )
        .route(
            "/api/generate",
            post(handlers::generate).fallback(error::method_not_allowed),
        )
        .route(
            "/api/generate-shooting-plan",
            post(handlers::generate_shooting_plan).fallback(error::method_not_allowed),
        )
        .route(
            "/api/generate-pose-prompt",
            post(handlers::generate_pose_prompt).fallback(error::method_not_allowed),
        )
        .route(
            "/api/generate-image",
            post(handlers::generate_image).fallback(error::method_not_allowed),
        )
        .route(
            "/api/health",
            get(handlers::health).fallback(error::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_span))
        .with_state(state)
}

/// Wrap each request in a span carrying a fresh request id
async fn request_span(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::now_v7();
    let span = info_span!(
        "request",
        id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );
    async move {
        let response = next.run(request).await;
        debug!(status = %response.status(), "request_span: done");
        response
    }
    .instrument(span)
    .await
}

/// Bind the configured address and serve until ctrl-c
pub async fn serve(config: &Config) -> Result<()> {
    debug!(bind = %config.server.bind, "serve: called");
    let state = Arc::new(ApiState::from_config(config).context("Failed to create provider client")?);

    let mut app = router(state);
    if config.server.cors {
        debug!("serve: enabling permissive CORS");
        app = app.layer(CorsLayer::permissive());
    }

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .context(format!("Failed to bind {}", config.server.bind))?;
    info!("Gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
