// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Runtime sentence-embedding engine.
//!
//! Wraps an ONNX export of a sentence transformer (all-MiniLM-L6-v2 by
//! default) behind the [`TextEmbedder`] trait:
//! - BERT tokenization with per-batch padding and truncation
//! - one session run per request batch
//! - attention-mask-weighted mean pooling over token embeddings

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayViewD, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use super::{EngineError, ModelFiles, TextEmbedder};

/// Token budget per input text; longer inputs are truncated by the tokenizer.
const MAX_SEQUENCE_LENGTH: usize = 256;

/// ONNX-based embedding engine.
///
/// Built once at startup and shared across all in-flight requests. The
/// session sits behind a mutex; concurrent `embed_batch` calls serialize on
/// the inference run, which keeps the engine safe to invoke from any number
/// of request workers.
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_name: String,
    dimension: usize,
}

impl std::fmt::Debug for OnnxEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbedder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbedder {
    /// Builds a runnable engine from fetched model artifacts.
    ///
    /// Loads the tokenizer and the ONNX session, then runs a one-off probe
    /// inference to discover the model's output dimension. Fails with
    /// [`EngineError::Load`] if either artifact is missing or malformed.
    ///
    /// This call blocks; callers on the async runtime should move it to a
    /// blocking task.
    pub fn load(files: &ModelFiles) -> Result<Self, EngineError> {
        Self::load_inner(files).map_err(EngineError::Load)
    }

    fn load_inner(files: &ModelFiles) -> Result<Self> {
        if !files.model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", files.model_path.display());
        }
        if !files.tokenizer_path.exists() {
            anyhow::bail!(
                "tokenizer file not found: {}",
                files.tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("failed to set optimization level")?
            .with_intra_threads(4)
            .context("failed to set intra threads")?
            .commit_from_file(&files.model_path)
            .with_context(|| {
                format!(
                    "failed to load ONNX model from {}",
                    files.model_path.display()
                )
            })?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)
            .map_err(|e| anyhow!("failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("failed to configure truncation: {}", e))?;

        let mut embedder = Self {
            session: Mutex::new(session),
            tokenizer,
            model_name: files.repo_id.clone(),
            dimension: 0,
        };

        // Probe inference: the output dimension is a property of the loaded
        // model, not configuration.
        let probe = embedder
            .run_batch(&["dimension probe".to_string()])
            .context("probe inference failed")?;
        embedder.dimension = probe
            .first()
            .map(|v| v.len())
            .filter(|&d| d > 0)
            .ok_or_else(|| anyhow!("model produced an empty probe embedding"))?;

        info!(
            "loaded {} ({} dimensions)",
            embedder.model_name, embedder.dimension
        );

        Ok(embedder)
    }

    /// Tokenizes, pads, and runs one inference over the whole batch.
    fn run_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let encodings: Vec<_> = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow!("tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        // Pad every sequence to the longest one in the batch.
        let mut input_ids = Vec::with_capacity(texts.len() * max_len);
        let mut attention_mask = Vec::with_capacity(texts.len() * max_len);
        let mut token_type_ids = Vec::with_capacity(texts.len() * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(mask.iter().map(|&m| m as i64));
            token_type_ids.extend(std::iter::repeat(0i64).take(ids.len()));

            let padding = max_len - ids.len();
            input_ids.extend(std::iter::repeat(0i64).take(padding));
            attention_mask.extend(std::iter::repeat(0i64).take(padding));
            token_type_ids.extend(std::iter::repeat(0i64).take(padding));
        }

        let mask_for_pooling = attention_mask.clone();

        let input_ids_array = Array2::from_shape_vec((texts.len(), max_len), input_ids)
            .context("failed to create input_ids array")?;
        let attention_mask_array = Array2::from_shape_vec((texts.len(), max_len), attention_mask)
            .context("failed to create attention_mask array")?;
        let token_type_ids_array = Array2::from_shape_vec((texts.len(), max_len), token_type_ids)
            .context("failed to create token_type_ids array")?;

        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?,
            "token_type_ids" => Value::from_array(token_type_ids_array)?
        ])?;

        // Token-level output: [batch, seq_len, hidden_dim].
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("failed to extract output tensor")?;
        if output.ndim() != 3 {
            anyhow::bail!(
                "model output has unexpected shape {:?} (expected [batch, seq_len, hidden])",
                output.shape()
            );
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch_idx in 0..texts.len() {
            let token_embeddings = output.index_axis(Axis(0), batch_idx);
            let item_mask = &mask_for_pooling[batch_idx * max_len..(batch_idx + 1) * max_len];
            embeddings.push(mean_pool(token_embeddings, item_mask));
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl TextEmbedder for OnnxEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        self.run_batch(texts).map_err(EngineError::Inference)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Mean pooling over the sequence dimension, weighted by the attention mask
/// so padding tokens do not contribute.
///
/// `token_embeddings` has shape `[seq_len, hidden_dim]`; `attention_mask`
/// has one entry per sequence position.
fn mean_pool(token_embeddings: ArrayViewD<'_, f32>, attention_mask: &[i64]) -> Vec<f32> {
    let seq_len = token_embeddings.shape()[0];
    let hidden_dim = token_embeddings.shape()[1];

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut mask_sum = 0.0f32;

    for i in 0..seq_len {
        let mask_value = attention_mask[i] as f32;
        mask_sum += mask_value;
        for j in 0..hidden_dim {
            pooled[j] += token_embeddings[[i, j]] * mask_value;
        }
    }

    for value in &mut pooled {
        *value /= mask_sum.max(1e-9);
    }

    pooled
}
