// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP server assembly: routes, middleware chain, listener.

use axum::extract::State;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::embed::embeddings_handler;
use crate::api::middleware::{apply_cors, require_api_key, CorsPolicy};
use crate::config::Settings;
use crate::embeddings::TextEmbedder;

/// Process-wide request state: the engine handle plus the immutable auth and
/// CORS configuration. Cheap to clone, never mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub embedder: Arc<dyn TextEmbedder>,
    pub auth_key: Option<String>,
    pub cors: CorsPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub dimension: usize,
}

/// Builds the router.
///
/// Middleware ordering, outermost first: trace, CORS, then auth around the
/// embeddings route. CORS must wrap auth so preflight `OPTIONS` requests
/// never need an API key. The health probe sits outside the auth gate.
pub fn create_app(state: AppState) -> Router {
    let gated = Router::new()
        .route("/embeddings", post(embeddings_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(gated)
        .layer(middleware::from_fn_with_state(state.clone(), apply_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(
    settings: &Settings,
    embedder: Arc<dyn TextEmbedder>,
) -> anyhow::Result<()> {
    if settings.auth_key.is_none() {
        warn!("AUTH_KEY is not set. The API is not protected.");
    }

    let state = AppState {
        embedder,
        auth_key: settings.auth_key.clone(),
        cors: CorsPolicy::from_setting(&settings.cors_allowed_origins)?,
    };
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.api_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("embedding API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        model: state.embedder.model_name().to_string(),
        dimension: state.embedder.dimension(),
    })
}
