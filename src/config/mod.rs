// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Process configuration, read once from the environment at startup.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_MODEL_CACHE_DIR: &str = "./models";
pub const DEFAULT_API_PORT: u16 = 8080;

/// Immutable process-wide settings.
///
/// Parsed from the environment exactly once in `main` and handed to the
/// server and middleware constructors; nothing reads env vars per-request.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared secret for the API key check. `None` disables auth.
    pub auth_key: Option<String>,
    /// Allowed origin, or `*` to reflect the caller's origin.
    pub cors_allowed_origins: String,
    /// Listen port.
    pub api_port: u16,
    /// Hugging Face repo id of the embedding model.
    pub model_repo: String,
    /// Local cache directory for model artifacts.
    pub model_cache_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let auth_key = normalize_auth_key(env::var("AUTH_KEY").ok());
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
        let api_port = match env::var("API_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("API_PORT is not a valid port: {}", raw))?,
            Err(_) => DEFAULT_API_PORT,
        };
        let model_repo =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_REPO.to_string());
        let model_cache_dir = PathBuf::from(
            env::var("MODEL_CACHE_DIR").unwrap_or_else(|_| DEFAULT_MODEL_CACHE_DIR.to_string()),
        );

        Ok(Self {
            auth_key,
            cors_allowed_origins,
            api_port,
            model_repo,
            model_cache_dir,
        })
    }
}

/// An empty `AUTH_KEY` is indistinguishable from an unset one; both mean
/// auth is disabled.
fn normalize_auth_key(raw: Option<String>) -> Option<String> {
    raw.filter(|key| !key.is_empty())
}
