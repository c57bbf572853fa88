// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding engine boundary.
//!
//! The rest of the node talks to the engine through the [`TextEmbedder`]
//! trait so that handlers can be exercised against a substitute engine.
//! The production implementation is [`OnnxEmbedder`], backed by ONNX
//! Runtime and the all-MiniLM-L6-v2 sentence transformer.

pub mod fetch;
pub mod onnx_model;

pub use fetch::{fetch_model_files, ModelFiles};
pub use onnx_model::OnnxEmbedder;

use async_trait::async_trait;

/// Errors crossing the engine boundary, tagged by lifecycle phase.
///
/// `Download` and `Load` can only occur during startup and are fatal there;
/// `Inference` occurs at request time and is recovered per-request.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model download failed: {0}")]
    Download(anyhow::Error),

    #[error("model load failed: {0}")]
    Load(anyhow::Error),

    #[error("inference failed: {0}")]
    Inference(anyhow::Error),
}

/// A loaded sentence-embedding model.
///
/// Implementations must be safe to call concurrently from multiple in-flight
/// requests. `embed_batch` returns one vector per input text, positionally
/// aligned with the input batch.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embeds a batch of texts in one engine call.
    ///
    /// An empty batch returns an empty vec without touching the model.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError>;

    /// Model identifier (e.g. "sentence-transformers/all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;

    /// Output dimension of this model.
    fn dimension(&self) -> usize;
}
