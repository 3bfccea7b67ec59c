// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `reqtrace` binary.

use std::time::Duration;

use reqtrace_specs::ReqtraceProcess;

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn http_health() -> anyhow::Result<()> {
    let rt = ReqtraceProcess::build().keep(5).spawn()?;
    rt.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value =
        reqwest::get(format!("{}/api/v1/health", rt.base_url())).await?.json().await?;

    assert_eq!(resp["status"], "running");
    assert_eq!(resp["service"], "smoke");
    assert_eq!(resp["version"], reqtrace::VERSION);
    assert_eq!(resp["capacity"], 5);
    assert_eq!(resp["populated"], 0);
    Ok(())
}

#[tokio::test]
async fn capture_then_view() -> anyhow::Result<()> {
    let rt = ReqtraceProcess::start()?;
    rt.wait_healthy(TIMEOUT).await?;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/callback/github?id=9", rt.base_url()))
        .header("x-hub-signature", "sha256=abc")
        .body("{\"action\":\"opened\"}")
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let live = resp.text().await?;
    assert!(live.contains("POST /callback/github?id=9 HTTP/1.1"));

    let entry: serde_json::Value =
        client.get(format!("{}/api/v1/captures/0", rt.base_url())).send().await?.json().await?;
    assert_eq!(entry["method"], "POST");
    assert_eq!(entry["uri"], "/callback/github?id=9");
    assert_eq!(entry["ip"], "127.0.0.1");
    let raw = entry["request"].as_str().unwrap_or_default();
    assert!(raw.contains("X-Hub-Signature: sha256=abc"));
    assert!(raw.ends_with("{\"action\":\"opened\"}"));

    let viewer = client.get(format!("{}/debug/0", rt.base_url())).send().await?.text().await?;
    assert!(viewer.contains("smoke::debug"));
    assert!(viewer.contains("/callback/github?id=9"));
    Ok(())
}

#[tokio::test]
async fn rolls_over_retention() -> anyhow::Result<()> {
    let rt = ReqtraceProcess::build().keep(2).spawn()?;
    rt.wait_healthy(TIMEOUT).await?;
    let client = reqwest::Client::new();

    for path in ["a", "b", "c"] {
        client.get(format!("{}/{path}", rt.base_url())).send().await?;
    }

    let list: serde_json::Value =
        client.get(format!("{}/api/v1/captures", rt.base_url())).send().await?.json().await?;
    let uris: Vec<&str> = list["captures"]
        .as_array()
        .map(|a| a.iter().filter_map(|e| e["uri"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(uris, vec!["/b", "/c"]);

    let resp = client.get(format!("{}/api/v1/captures/2", rt.base_url())).send().await?;
    assert_eq!(resp.status(), reqwest::StatusCode::RANGE_NOT_SATISFIABLE);
    Ok(())
}

#[tokio::test]
async fn ignored_uris_are_skipped() -> anyhow::Result<()> {
    let rt = ReqtraceProcess::build().ignore("/favicon.ico").ignore("/robots.txt").spawn()?;
    rt.wait_healthy(TIMEOUT).await?;
    let client = reqwest::Client::new();

    for path in ["/favicon.ico", "/robots.txt"] {
        let resp = client.get(format!("{}{path}", rt.base_url())).send().await?;
        assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);
    }

    let health: serde_json::Value =
        client.get(format!("{}/api/v1/health", rt.base_url())).send().await?.json().await?;
    assert_eq!(health["total"], 0);
    Ok(())
}

#[tokio::test]
async fn invalid_flags_exit_with_status_2() -> anyhow::Result<()> {
    let status = ReqtraceProcess::build().keep(0).run_to_exit()?;
    assert_eq!(status.code(), Some(2));

    let status = ReqtraceProcess::build().debug_path("/").run_to_exit()?;
    assert_eq!(status.code(), Some(2));
    Ok(())
}
