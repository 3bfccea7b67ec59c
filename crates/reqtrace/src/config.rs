// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use crate::store::{StoreConfig, MAX_KEEP};

/// Capture inbound HTTP requests and browse the most recent ones.
#[derive(Debug, Clone, Parser)]
#[command(name = "reqtrace", version, about)]
pub struct Config {
    /// Host address to bind to.
    #[arg(long, env = "REQTRACE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, env = "REQTRACE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Service display name shown in the viewer.
    #[arg(long, env = "REQTRACE_NAME", default_value = "reqtrace")]
    pub name: String,

    /// Number of recent requests to keep.
    #[arg(long, env = "REQTRACE_KEEP", default_value_t = 20)]
    pub keep: usize,

    /// Request URIs (path + query, exact match) that are never captured.
    #[arg(
        long = "ignore",
        env = "REQTRACE_IGNORE",
        value_delimiter = ',',
        default_value = "/favicon.ico"
    )]
    pub ignore: Vec<String>,

    /// Path prefix of the debug viewer.
    #[arg(long, env = "REQTRACE_DEBUG_PATH", default_value = "/debug")]
    pub debug_path: String,

    /// Largest request body recorded, in bytes.
    #[arg(long, env = "REQTRACE_MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Log filter (tracing `EnvFilter` syntax).
    #[arg(long, env = "REQTRACE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (text or json).
    #[arg(long, env = "REQTRACE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

impl Config {
    /// Validate flag combinations that clap cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.keep == 0 {
            anyhow::bail!("--keep must be at least 1");
        }
        if self.keep > MAX_KEEP {
            anyhow::bail!("--keep must be at most {MAX_KEEP}");
        }
        if !self.debug_path.starts_with('/') {
            anyhow::bail!("--debug-path must start with '/'");
        }
        if self.debug_prefix().is_empty() {
            anyhow::bail!("--debug-path cannot be the root path");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("--max-body-bytes must be greater than 0");
        }
        match self.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    /// Debug viewer prefix without a trailing slash.
    pub fn debug_prefix(&self) -> &str {
        self.debug_path.trim_end_matches('/')
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            name: self.name.clone(),
            keep: self.keep,
            ignore: self.ignore.iter().filter(|u| !u.is_empty()).cloned().collect(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
