// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::dump;
use crate::store::CaptureEntry;
use crate::transport::AppState;

/// Label recorded for requests captured by [`capture_layer`].
pub const CUSTOM_LABEL: &str = "Custom";

/// Label recorded for requests captured by the fallback handler.
pub const DEFAULT_LABEL: &str = "Default";

/// Buffer and record `req`, returning it ready for the next handler.
///
/// The entry is `None` when the URI is ignored.
pub async fn record(
    state: &AppState,
    label: &str,
    req: Request,
) -> (Request, Option<Arc<CaptureEntry>>) {
    let (req, capture) = dump::buffer_request(req, label, state.max_body_bytes).await;
    let entry = state.store.capture_entry(capture);
    (req, entry)
}

/// Axum middleware that captures every request before passing it on.
///
/// Ignored URIs are passed through untouched.
pub async fn capture_layer(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if state.store.is_ignored(dump::request_uri(req.uri())) {
        return next.run(req).await;
    }
    let (req, _) = record(&state, CUSTOM_LABEL, req).await;
    next.run(req).await
}
