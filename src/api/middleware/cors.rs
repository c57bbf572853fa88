// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Origin-based CORS middleware.
//!
//! Hand-rolled rather than `tower_http::cors` because the contract here is
//! stricter: the headers go on every response whether or not the request
//! carries an `Origin`, and any `OPTIONS` request short-circuits to an empty
//! 200 before the rest of the chain runs. Preflights therefore never need an
//! API key, which is why this layer sits outside the auth layer.

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::http_server::AppState;

/// `CORS_ALLOWED_ORIGINS` value that switches on origin reflection.
pub const WILDCARD_ORIGIN: &str = "*";

/// Header allow-list; includes the API key header so authenticated
/// cross-origin calls pass preflight.
const ALLOW_HEADERS: &str = "Content-Type, Baggage, Accept, Sentry-Trace, X-API-KEY";

/// Allowed-origin policy, decided once at startup.
#[derive(Debug, Clone)]
pub enum CorsPolicy {
    /// Always emit this fixed origin.
    Exact(HeaderValue),
    /// Echo the caller's `Origin` header verbatim.
    MirrorOrigin,
}

impl CorsPolicy {
    /// Parses the `CORS_ALLOWED_ORIGINS` setting.
    ///
    /// An unset/empty setting yields an empty `Allow-Origin` header value,
    /// which no browser will match.
    pub fn from_setting(setting: &str) -> Result<Self> {
        if setting == WILDCARD_ORIGIN {
            Ok(CorsPolicy::MirrorOrigin)
        } else {
            let origin = HeaderValue::from_str(setting)
                .with_context(|| format!("CORS_ALLOWED_ORIGINS is not a valid header value: {}", setting))?;
            Ok(CorsPolicy::Exact(origin))
        }
    }
}

pub async fn apply_cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allow_origin = match &state.cors {
        CorsPolicy::Exact(origin) => origin.clone(),
        CorsPolicy::MirrorOrigin => request
            .headers()
            .get(header::ORIGIN)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("")),
    };

    // Preflight short-circuit: browsers send OPTIONS without credentials or
    // custom headers, so it must not fall through to the auth check.
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );

    response
}
