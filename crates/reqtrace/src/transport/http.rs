// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the viewer, the JSON API and the capture fallback.

use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::render::{self, EntryPage, Mode};
use crate::store::{CaptureEntry, StoreStats, MAX_KEEP};
use crate::transport::capture::{record, DEFAULT_LABEL};
use crate::transport::AppState;
use crate::VERSION;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub capacity: usize,
    pub populated: usize,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct CapturesResponse {
    pub stats: StoreStats,
    /// Oldest first.
    pub captures: Vec<CaptureEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    /// New retention count; absent or 0 keeps the current one.
    #[serde(default)]
    pub keep: Option<usize>,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = s.store.stats();
    Json(HealthResponse {
        status: "running".to_owned(),
        service: s.store.name().to_owned(),
        version: VERSION.to_owned(),
        capacity: stats.capacity,
        populated: stats.populated,
        total: stats.total,
    })
}

/// `GET /api/v1/captures`
pub async fn list_captures(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let (entries, stats) = s.store.snapshot_with_stats();
    let captures = entries.iter().map(|e| e.as_ref().clone()).collect();
    Json(CapturesResponse { stats, captures })
}

/// `GET /api/v1/captures/{n}`: the capture `n` requests ago.
pub async fn get_capture(State(s): State<Arc<AppState>>, Path(n): Path<String>) -> Response {
    let Ok(n) = n.parse::<usize>() else {
        return ErrorCode::BadRequest
            .to_http_response(format!("invalid offset: {n}"))
            .into_response();
    };
    match s.store.lookup(n) {
        Ok(entry) => Json(entry.as_ref().clone()).into_response(),
        Err(code) => code.to_http_response(code.message()).into_response(),
    }
}

/// `DELETE /api/v1/captures`: drop all captures, optionally resizing.
pub async fn reset_captures(
    State(s): State<Arc<AppState>>,
    Query(q): Query<ResetQuery>,
) -> Response {
    let keep = q.keep.unwrap_or(0);
    if let Err(code) = s.store.reset(keep) {
        return code
            .to_http_response(format!("keep must be at most {MAX_KEEP}, got {keep}"))
            .into_response();
    }
    Json(s.store.stats()).into_response()
}

/// `GET {debug}`: every capture, newest first.
pub async fn debug_index(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let entries = s.store.snapshot();
    Html(render::index_page(s.store.name(), &s.debug_path, &entries))
}

/// `GET {debug}/{n}`: the capture `n` requests ago.
///
/// Offsets that do not parse show the newest capture.
pub async fn debug_entry(
    State(s): State<Arc<AppState>>,
    Path(n): Path<String>,
) -> impl IntoResponse {
    let n = n.parse::<usize>().unwrap_or(0);
    let (result, stats) = s.store.lookup_with_stats(n);

    let (entry, error) = match &result {
        Ok(entry) => (Some(entry.as_ref()), None),
        Err(code) => {
            tracing::debug!(offset = n, code = %code, "debug lookup missed");
            (None, Some(code.message()))
        }
    };
    Html(render::entry_page(&EntryPage {
        service: s.store.name(),
        mode: Mode::Debug,
        debug_path: &s.debug_path,
        entry,
        error,
        populated: stats.populated,
        current: Some(n),
    }))
}

/// Fallback: capture the request and echo it back as a page.
pub async fn capture_default(State(s): State<Arc<AppState>>, req: Request) -> Response {
    let (_, entry) = record(&s, DEFAULT_LABEL, req).await;
    let Some(entry) = entry else {
        return StatusCode::NO_CONTENT.into_response();
    };
    Html(render::entry_page(&EntryPage {
        service: s.store.name(),
        mode: Mode::Live,
        debug_path: &s.debug_path,
        entry: Some(entry.as_ref()),
        error: None,
        populated: 0,
        current: None,
    }))
    .into_response()
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
