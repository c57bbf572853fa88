// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CORS middleware tests.
//!
//! These tests verify that:
//! - The full header set is present on every response, OPTIONS included
//! - A configured origin is emitted verbatim; wildcard mode echoes the
//!   caller's Origin header
//! - OPTIONS short-circuits to an empty 200 before the auth gate runs

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt; // for `oneshot`

use super::support::{app, post_embeddings, read_body};

fn options_embeddings(origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::OPTIONS)
        .uri("/embeddings");
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    builder.body(Body::empty()).unwrap()
}

fn header_str<'a>(response: &'a axum::response::Response, name: &header::HeaderName) -> &'a str {
    response
        .headers()
        .get(name)
        .map(|value| value.to_str().unwrap())
        .unwrap_or_else(|| panic!("missing header {}", name))
}

/// Test 1: Configured origin on a normal response
#[tokio::test]
async fn test_exact_origin_on_post_response() {
    let app = app(None, "https://example.com");

    let response = app.oneshot(post_embeddings(r#"["hi"]"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "https://example.com"
    );
}

/// Test 2: Full header set on every response
#[tokio::test]
async fn test_full_header_set_present() {
    let app = app(None, "https://example.com");

    let response = app.oneshot(post_embeddings(r#"["hi"]"#)).await.unwrap();

    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
        "true"
    );
    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_METHODS),
        "POST"
    );
    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_HEADERS),
        "Content-Type, Baggage, Accept, Sentry-Trace, X-API-KEY"
    );
    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_EXPOSE_HEADERS),
        "Content-Type"
    );
}

/// Test 3: Headers are set on error responses too
#[tokio::test]
async fn test_headers_present_on_error_response() {
    let app = app(None, "https://example.com");

    let response = app.oneshot(post_embeddings("[1,2,3]")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "https://example.com"
    );
}

/// Test 4: Configured origin on OPTIONS
#[tokio::test]
async fn test_exact_origin_on_options() {
    let app = app(None, "https://example.com");

    let response = app.oneshot(options_embeddings(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "https://example.com"
    );
}

/// Test 5: Wildcard mode echoes the caller's origin
#[tokio::test]
async fn test_wildcard_echoes_request_origin() {
    let app = app(None, "*");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/embeddings")
        .header("content-type", "application/json")
        .header(header::ORIGIN, "https://foo.test")
        .body(Body::from(r#"["hi"]"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "https://foo.test"
    );
}

/// Test 6: Wildcard mode without an Origin header
///
/// Mirrors the reflected-origin behavior: nothing to echo yields an empty
/// value, which no browser will match.
#[tokio::test]
async fn test_wildcard_without_origin_is_empty() {
    let app = app(None, "*");

    let response = app.oneshot(options_embeddings(None)).await.unwrap();

    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
        ""
    );
}

/// Test 7: Preflight needs no API key
///
/// OPTIONS must short-circuit to 200 with an empty body even when auth is
/// enabled and no key is attached — browsers do not send custom headers on
/// preflight requests.
#[tokio::test]
async fn test_options_short_circuits_before_auth() {
    let app = app(Some("secret123"), "https://example.com");

    let response = app
        .oneshot(options_embeddings(Some("https://example.com")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "https://example.com"
    );
    assert!(read_body(response).await.is_empty());
}

/// Test 8: OPTIONS short-circuits on any route under the chain
#[tokio::test]
async fn test_options_on_health_route() {
    let app = app(Some("secret123"), "https://example.com");

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_body(response).await.is_empty());
}
