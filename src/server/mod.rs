//! HTTP server module.
//!
//! This module provides:
//! - The axum router and shared request state
//! - Route handlers for extraction, downloads and the preview proxy
//! - JSON and plain-text error responses

pub mod error;
pub mod handlers;

use std::path::PathBuf;

use axum::http::header::CONTENT_DISPOSITION;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::InstagramApi;
use crate::config::Config;
use crate::error::Result;

pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub api: InstagramApi,
    pub workspace_root: PathBuf,
    pub frontend: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: &Config, api: InstagramApi) -> Self {
        Self {
            api,
            workspace_root: config.workspace_root(),
            frontend: config.server.frontend.clone(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/proxy", get(handlers::proxy))
        .route("/api/extract", post(handlers::extract))
        .route("/api/download", post(handlers::download))
        .route("/api/download_all", post(handlers::download_all))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when the allow-list is empty, otherwise only the listed ones.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        tracing::info!("CORS allow-list: {:?}", allowed_origins);
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION])
}

/// Bind the configured address and serve until Ctrl+C.
pub async fn serve(config: &Config, api: InstagramApi) -> Result<()> {
    let workspace_root = config.workspace_root();
    tokio::fs::create_dir_all(&workspace_root).await?;

    let app = router(AppState::new(config, api), &config.server.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
