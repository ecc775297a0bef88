// src/api/mod.rs — HTTP scoring API

pub mod handlers;
pub mod types;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::feedback::FeedbackGenerator;
use crate::infra::config::ServerConfig;
use crate::scoring::ScoringPipeline;

/// Essays shorter than this are rejected before scoring.
pub const MIN_ESSAY_CHARS: usize = 10;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<ScoringPipeline>,
    pub feedback: Arc<FeedbackGenerator>,
}

/// Build the axum router with all API routes.
pub fn build_router(state: ApiState) -> Router {
    // scoring is served to browser frontends on other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/score", post(handlers::score_essay))
        .route("/essay-sets", get(handlers::list_essay_sets))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the configured address (blocking).
pub async fn start_server(config: &ServerConfig, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let router = build_router(state);

    tracing::info!("Scoring API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
