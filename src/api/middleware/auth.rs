// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Static API-key gate.
//!
//! Compares the `X-API-KEY` request header against the secret captured at
//! startup. With no secret configured the middleware passes everything
//! through; the one-time warning about that is emitted where the state is
//! built, not per-request.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// Request header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.auth_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
