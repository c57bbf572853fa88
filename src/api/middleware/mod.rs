// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request middleware.
//!
//! Chain ordering is a correctness requirement, not a convenience: CORS runs
//! before auth so that preflight `OPTIONS` requests succeed without an API
//! key. `http_server::create_app` pins that ordering.

pub mod auth;
pub mod cors;

pub use auth::{require_api_key, API_KEY_HEADER};
pub use cors::{apply_cors, CorsPolicy, WILDCARD_ORIGIN};
