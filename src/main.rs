// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use embed_node::{
    api,
    config::Settings,
    embeddings::{fetch_model_files, OnnxEmbedder, TextEmbedder},
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env()?;
    info!(
        "starting embedding node (model: {}, cache: {})",
        settings.model_repo,
        settings.model_cache_dir.display()
    );

    // Model acquisition and session build are blocking; keep them off the
    // runtime workers. Any failure here aborts startup before the socket is
    // bound.
    let files = {
        let repo = settings.model_repo.clone();
        let cache_dir = settings.model_cache_dir.clone();
        tokio::task::spawn_blocking(move || fetch_model_files(&repo, &cache_dir)).await??
    };

    let embedder = tokio::task::spawn_blocking(move || OnnxEmbedder::load(&files)).await??;
    info!(
        "embedding engine ready: {} ({} dimensions)",
        embedder.model_name(),
        embedder.dimension()
    );

    api::start_server(&settings, Arc::new(embedder)).await
}
