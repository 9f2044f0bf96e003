//! HTTP API for the byline article crew.
//!
//! One inbound operation: post a topic, get the finished article back with
//! a download-friendly filename.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check (exempt from auth)
//! - `POST /api/v1/articles` - Run the plan → write → edit pipeline
//!
//! # Environment variables
//!
//! - `BYLINE_API_KEY` - Bearer token for authentication (optional)
//! - `BYLINE_BIND_ADDR` - Server bind address (default: 127.0.0.1)
//! - `TOGETHER_API_KEY` / `SERPER_API_KEY` - Backend credentials

pub mod auth;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use auth::ApiKeyConfig;
pub use state::AppState;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>, api_key: Option<ApiKeyConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/articles", post(routes::generate_article));

    if let Some(key) = api_key {
        router = router.layer(axum::middleware::from_fn(
            move |request: axum::extract::Request, next: axum::middleware::Next| {
                let key = key.clone();
                async move { auth::require_api_key(key, request, next).await }
            },
        ));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given address.
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
    api_key: Option<ApiKeyConfig>,
) -> anyhow::Result<()> {
    let router = create_router(state, api_key);

    info!(%addr, "Starting byline API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
