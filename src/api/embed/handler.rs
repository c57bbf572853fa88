// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embeddings handler.
//!
//! The request body is a bare JSON array of strings; the response is a JSON
//! array of embedding vectors, positionally aligned with the input. The
//! whole batch goes to the engine in one call, no chunking and no partial
//! results.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::error;

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// # Errors
/// - 400 when the body does not decode as a JSON array of strings (the
///   engine is never invoked)
/// - 500 when inference fails; the cause is logged server-side and the
///   client sees a generic message
pub async fn embeddings_handler(
    State(state): State<AppState>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<Json<Vec<Vec<f32>>>, ApiError> {
    let Json(batch) = payload?;

    let vectors = state.embedder.embed_batch(&batch).await.map_err(|e| {
        error!("embedding batch of {} texts failed: {}", batch.len(), e);
        ApiError::Inference
    })?;

    Ok(Json(vectors))
}
