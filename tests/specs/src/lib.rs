// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `reqtrace` binary as a subprocess and exercises it over
//! HTTP.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Once;
use std::time::Duration;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `reqtrace` binary.
pub fn reqtrace_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("reqtrace")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running `reqtrace` process that is killed on drop.
pub struct ReqtraceProcess {
    child: Child,
    port: u16,
}

/// Builder for the flags a [`ReqtraceProcess`] is started with.
#[derive(Default)]
pub struct ReqtraceBuilder {
    keep: Option<usize>,
    ignore: Vec<String>,
    debug_path: Option<String>,
    extra: Vec<String>,
}

impl ReqtraceBuilder {
    /// Retention count (`--keep`).
    pub fn keep(mut self, keep: usize) -> Self {
        self.keep = Some(keep);
        self
    }

    /// Add an ignored URI (`--ignore`).
    pub fn ignore(mut self, uri: &str) -> Self {
        self.ignore.push(uri.to_owned());
        self
    }

    /// Viewer prefix (`--debug-path`).
    pub fn debug_path(mut self, path: &str) -> Self {
        self.debug_path = Some(path.to_owned());
        self
    }

    /// Pass an arbitrary extra flag through.
    pub fn arg(mut self, arg: &str) -> Self {
        self.extra.push(arg.to_owned());
        self
    }

    fn args(&self, port: u16) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--host".into(),
            "127.0.0.1".into(),
            "--port".into(),
            port.to_string(),
            "--name".into(),
            "smoke".into(),
            "--log-level".into(),
            "warn".into(),
        ];
        if let Some(keep) = self.keep {
            args.extend(["--keep".into(), keep.to_string()]);
        }
        for uri in &self.ignore {
            args.extend(["--ignore".into(), uri.clone()]);
        }
        if let Some(ref path) = self.debug_path {
            args.extend(["--debug-path".into(), path.clone()]);
        }
        args.extend(self.extra.iter().cloned());
        args
    }

    /// Spawn reqtrace with the configured flags.
    pub fn spawn(self) -> anyhow::Result<ReqtraceProcess> {
        ensure_crypto();
        let binary = reqtrace_binary();
        anyhow::ensure!(binary.exists(), "reqtrace binary not found at {}", binary.display());

        let port = free_port()?;
        let child = Command::new(&binary)
            .args(self.args(port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(ReqtraceProcess { child, port })
    }

    /// Run reqtrace to completion with the configured flags, returning its exit status.
    pub fn run_to_exit(self) -> anyhow::Result<std::process::ExitStatus> {
        let binary = reqtrace_binary();
        anyhow::ensure!(binary.exists(), "reqtrace binary not found at {}", binary.display());
        let port = free_port()?;
        Ok(Command::new(&binary)
            .args(self.args(port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?)
    }
}

impl ReqtraceProcess {
    /// Create a builder for custom flags.
    pub fn build() -> ReqtraceBuilder {
        ReqtraceBuilder::default()
    }

    /// Spawn reqtrace with default flags.
    pub fn start() -> anyhow::Result<Self> {
        Self::build().spawn()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll health until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("reqtrace did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for ReqtraceProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
