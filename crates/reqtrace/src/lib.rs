// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reqtrace: capture inbound HTTP requests and browse the most recent ones.

pub mod config;
pub mod dump;
pub mod error;
pub mod net;
pub mod render;
pub mod rolling;
pub mod store;
pub mod test_support;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::store::CaptureStore;
use crate::transport::{build_router, AppState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the capture server until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let shutdown = CancellationToken::new();

    let store = CaptureStore::new(config.store_config())?;
    let state = Arc::new(AppState {
        store: Arc::new(store),
        debug_path: config.debug_prefix().to_owned(),
        max_body_bytes: config.max_body_bytes,
    });

    let listener = TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    let shown = net::display_host(&config.host).await;
    tracing::info!(
        name = %config.name,
        keep = config.keep,
        ignore = ?config.ignore,
        "reqtrace v{VERSION} listening on {local}"
    );
    tracing::info!("debug viewer at http://{shown}:{}{}/0", local.port(), config.debug_prefix());

    spawn_signal_handler(shutdown.clone());

    let router = build_router(state);
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("reqtrace stopped");
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::warn!("failed to listen for SIGTERM: {e}");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
        tracing::info!("shutdown requested");
        shutdown.cancel();
    });
}
