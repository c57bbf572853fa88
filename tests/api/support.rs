// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for API tests: substitute engines and router builders.
//!
//! The stub engine produces deterministic per-text vectors, so tests can
//! verify positional alignment without model files on disk.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use embed_node::api::{create_app, AppState, CorsPolicy};
use embed_node::embeddings::{EngineError, TextEmbedder};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const STUB_DIMENSION: usize = 8;

/// Deterministic stand-in for the ONNX engine.
pub struct StaticEmbedder;

/// The vector `StaticEmbedder` produces for `text`. Distinct texts get
/// distinct vectors; the same text always gets the same vector.
pub fn expected_vector(text: &str) -> Vec<f32> {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let mut seed = hasher.finish();

    (0..STUB_DIMENSION)
        .map(|i| {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223) ^ (i as u64);
            (seed as f64 / u64::MAX as f64) as f32
        })
        .collect()
}

#[async_trait]
impl TextEmbedder for StaticEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        Ok(texts.iter().map(|text| expected_vector(text)).collect())
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }

    fn dimension(&self) -> usize {
        STUB_DIMENSION
    }
}

/// Engine whose every inference call fails.
pub struct FailingEmbedder;

#[async_trait]
impl TextEmbedder for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        Err(EngineError::Inference(anyhow::anyhow!(
            "session run rejected input"
        )))
    }

    fn model_name(&self) -> &str {
        "failing-model"
    }

    fn dimension(&self) -> usize {
        STUB_DIMENSION
    }
}

pub fn state_with(
    embedder: Arc<dyn TextEmbedder>,
    auth_key: Option<&str>,
    cors_setting: &str,
) -> AppState {
    AppState {
        embedder,
        auth_key: auth_key.map(String::from),
        cors: CorsPolicy::from_setting(cors_setting).expect("valid CORS setting"),
    }
}

/// Router with the deterministic stub engine.
pub fn app(auth_key: Option<&str>, cors_setting: &str) -> Router {
    create_app(state_with(Arc::new(StaticEmbedder), auth_key, cors_setting))
}

/// Router whose engine always fails, auth disabled.
pub fn failing_app() -> Router {
    create_app(state_with(Arc::new(FailingEmbedder), None, ""))
}

/// POST /embeddings with a JSON body.
pub fn post_embeddings(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/embeddings")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = read_body(response).await;
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
