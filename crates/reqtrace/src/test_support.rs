// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for unit and integration tests.

use std::sync::Arc;

use crate::store::{CaptureRequest, CaptureStore, StoreConfig};
use crate::transport::AppState;

/// Extension trait to convert any `Display` error into `anyhow::Error`.
/// Replaces `.map_err(|e| anyhow::anyhow!("{e}"))` with `.anyhow()`.
pub trait AnyhowExt<T> {
    fn anyhow(self) -> anyhow::Result<T>;
}

impl<T, E: std::fmt::Display> AnyhowExt<T> for Result<T, E> {
    fn anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}"))
    }
}

/// Assert that an expression is `Err` and its message contains `substr`.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

/// A `GET` capture request whose path and raw text carry `marker`.
pub fn capture_request(marker: &str) -> CaptureRequest {
    let uri = format!("/hook/{marker}");
    CaptureRequest {
        label: "Default".to_owned(),
        method: "GET".to_owned(),
        scheme: "http".to_owned(),
        host: "example.test".to_owned(),
        path: uri.clone(),
        raw: format!("GET {uri} HTTP/1.1\r\nHost: example.test\r\nX-Marker: {marker}"),
        uri,
        remote_ip: "10.0.0.1".to_owned(),
        error: None,
    }
}

/// Builder for [`AppState`] with test-friendly defaults.
pub struct AppStateBuilder {
    store: StoreConfig,
    debug_path: String,
    max_body_bytes: usize,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self {
            store: StoreConfig { name: "test".to_owned(), ..StoreConfig::default() },
            debug_path: "/debug".to_owned(),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep(mut self, keep: usize) -> Self {
        self.store.keep = keep;
        self
    }

    pub fn ignore(mut self, uri: &str) -> Self {
        self.store.ignore.push(uri.to_owned());
        self
    }

    pub fn debug_path(mut self, path: &str) -> Self {
        self.debug_path = path.to_owned();
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn build(self) -> anyhow::Result<Arc<AppState>> {
        let store = CaptureStore::new(self.store)?;
        Ok(Arc::new(AppState {
            store: Arc::new(store),
            debug_path: self.debug_path,
            max_body_bytes: self.max_body_bytes,
        }))
    }
}

/// Spawn an HTTP server on a random port for integration testing.
///
/// Returns the bound address and a join handle for the server task.
pub async fn spawn_http_server(
    state: Arc<AppState>,
) -> anyhow::Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    let router = crate::transport::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let app = router.into_make_service_with_connect_info::<std::net::SocketAddr>();
        let _ = axum::serve(listener, app).await;
    });
    Ok((addr, handle))
}
