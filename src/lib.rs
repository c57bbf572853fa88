// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;

pub use api::{create_app, ApiError, AppState, CorsPolicy, ErrorResponse};
pub use config::Settings;
pub use embeddings::{fetch_model_files, EngineError, ModelFiles, OnnxEmbedder, TextEmbedder};
