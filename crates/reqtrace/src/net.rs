// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::net::IpAddr;

use tokio::net::UdpSocket;

/// Preferred local IP for outbound traffic.
///
/// Connecting a UDP socket only selects a route; no packet is sent. Returns
/// `None` when the host has no usable route.
pub async fn outbound_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    socket.connect("8.8.8.8:80").await.ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// Address to print for humans: the outbound IP when bound to a wildcard.
pub async fn display_host(bind_host: &str) -> String {
    match bind_host {
        "0.0.0.0" | "::" | "" => match outbound_ip().await {
            Some(IpAddr::V6(ip)) => format!("[{ip}]"),
            Some(ip) => ip.to_string(),
            None => "localhost".to_owned(),
        },
        other => other.to_owned(),
    }
}

#[cfg(test)]
#[path = "net_tests.rs"]
mod tests;
