// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model artifact acquisition via the Hugging Face Hub.
//!
//! Downloads the ONNX export and tokenizer of a sentence-transformer repo
//! into a local cache directory. Artifacts already present in the cache are
//! reused, so this is a network no-op on warm restarts.

use anyhow::{Context, Result};
use hf_hub::api::sync::ApiBuilder;
use std::path::{Path, PathBuf};
use tracing::info;

use super::EngineError;

/// ONNX export path inside a sentence-transformers model repo.
const ONNX_MODEL_FILE: &str = "onnx/model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Local paths of the artifacts an [`super::OnnxEmbedder`] is built from.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// Hugging Face repo id the artifacts came from.
    pub repo_id: String,
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Path to the tokenizer JSON file.
    pub tokenizer_path: PathBuf,
}

/// Fetches the model and tokenizer artifacts for `repo_id` into `cache_dir`.
///
/// Performs network I/O on a cold cache. Fails with
/// [`EngineError::Download`] on network or filesystem problems.
///
/// This call blocks; callers on the async runtime should move it to a
/// blocking task.
pub fn fetch_model_files(repo_id: &str, cache_dir: &Path) -> Result<ModelFiles, EngineError> {
    fetch_inner(repo_id, cache_dir).map_err(EngineError::Download)
}

fn fetch_inner(repo_id: &str, cache_dir: &Path) -> Result<ModelFiles> {
    let api = ApiBuilder::new()
        .with_cache_dir(cache_dir.to_path_buf())
        .with_progress(true)
        .build()
        .context("failed to initialize Hugging Face Hub client")?;

    let repo = api.model(repo_id.to_string());

    info!("fetching {} from {}", ONNX_MODEL_FILE, repo_id);
    let model_path = repo
        .get(ONNX_MODEL_FILE)
        .with_context(|| format!("failed to fetch {} from {}", ONNX_MODEL_FILE, repo_id))?;

    info!("fetching {} from {}", TOKENIZER_FILE, repo_id);
    let tokenizer_path = repo
        .get(TOKENIZER_FILE)
        .with_context(|| format!("failed to fetch {} from {}", TOKENIZER_FILE, repo_id))?;

    Ok(ModelFiles {
        repo_id: repo_id.to_string(),
        model_path,
        tokenizer_path,
    })
}
