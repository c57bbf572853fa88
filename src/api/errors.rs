// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! API error taxonomy and its HTTP mapping.
//!
//! Every error leaves the process as `{"error": "<message>"}`; the HTTP
//! status code is the primary machine-readable signal.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed to decode as a JSON array of strings.
    #[error("{0}")]
    InvalidRequest(String),

    /// API key missing or mismatched. Deliberately carries no detail.
    #[error("unauthorized")]
    Unauthorized,

    /// Engine inference failed. The detail stays in the server log.
    #[error("inference failed")]
    Inference,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Inference => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Any body the `Json` extractor rejects is a client input error, mapped to
/// 400 regardless of which rejection variant axum produced.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}
