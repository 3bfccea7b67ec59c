// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: capture fallback, debug viewer and JSON API.

pub mod capture;
pub mod http;

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::CaptureStore;

/// Shared application state passed to all handlers via axum `State` extractor.
pub struct AppState {
    pub store: Arc<CaptureStore>,
    /// Debug viewer prefix, no trailing slash.
    pub debug_path: String,
    /// Body buffering limit for captured requests.
    pub max_body_bytes: usize,
}

/// Build the axum `Router` with the viewer, API and capture fallback.
pub fn build_router(state: Arc<AppState>) -> Router {
    build_router_with(state, Router::new())
}

/// Like [`build_router`], with application routes of the caller's own.
///
/// Every request reaching `custom` is captured (label `Custom`) before its
/// handler runs; anything unmatched falls through to the default capture
/// handler.
pub fn build_router_with(state: Arc<AppState>, custom: Router) -> Router {
    let debug = state.debug_path.clone();
    let custom =
        custom.layer(middleware::from_fn_with_state(Arc::clone(&state), capture::capture_layer));

    Router::new()
        // Health
        .route("/api/v1/health", get(http::health))
        // Captures
        .route("/api/v1/captures", get(http::list_captures).delete(http::reset_captures))
        .route("/api/v1/captures/{n}", get(http::get_capture))
        // Viewer
        .route(&debug, get(http::debug_index))
        .route(&format!("{debug}/"), get(http::debug_index))
        .route(&format!("{debug}/{{n}}"), get(http::debug_entry))
        // Everything else is captured
        .fallback(http::capture_default)
        .with_state(state)
        .merge(custom)
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
