// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialize live requests into the text form the store records.

use std::fmt::Write as _;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Request, Uri};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;

use crate::store::CaptureRequest;

/// Buffer the request body (up to `limit` bytes) and describe the request.
///
/// Returns the request rebuilt so the next handler sees the body unchanged. A
/// body that cannot be recorded does not fail the capture: the dump keeps the
/// head only and the reason is recorded instead. A body over `limit` is passed
/// on as the bytes already read followed by the unread rest of the stream.
pub async fn buffer_request(
    req: Request<Body>,
    label: &str,
    limit: usize,
) -> (Request<Body>, CaptureRequest) {
    let (parts, body) = req.into_parts();
    let (recorded, body, error) = match read_limited(body, limit).await {
        Buffered::Complete(bytes) => (bytes.clone(), Body::from(bytes), None),
        Buffered::Overflow(body) => {
            tracing::debug!(uri = %parts.uri, limit, "request body over limit, not recorded");
            (Bytes::new(), body, Some(format!("request body exceeds {limit} bytes, not recorded")))
        }
        Buffered::Failed(partial, e) => {
            tracing::warn!(uri = %parts.uri, err = %e, "failed to read request body");
            (Bytes::new(), Body::from(partial), Some(format!("failed to read request body: {e}")))
        }
    };

    let capture = CaptureRequest {
        label: label.to_owned(),
        method: parts.method.to_string(),
        scheme: scheme(&parts.headers, &parts.uri),
        host: host(&parts.headers, &parts.uri),
        path: parts.uri.path().to_owned(),
        uri: request_uri(&parts.uri).to_owned(),
        remote_ip: remote_ip(&parts.extensions),
        raw: dump(&parts, &recorded),
        error,
    };
    (Request::from_parts(parts, body), capture)
}

enum Buffered {
    /// The whole body, within the limit.
    Complete(Bytes),
    /// Over the limit: what was read so far chained with the unread rest.
    Overflow(Body),
    /// The stream errored; what was read before the error.
    Failed(Bytes, axum::Error),
}

async fn read_limited(body: Body, limit: usize) -> Buffered {
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(chunk) if buf.len() + chunk.len() > limit => {
                let head = futures_util::stream::iter([Ok(buf.freeze()), Ok(chunk)]);
                return Buffered::Overflow(Body::from_stream(head.chain(stream)));
            }
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(e) => return Buffered::Failed(buf.freeze(), e),
        }
    }
    Buffered::Complete(buf.freeze())
}

/// HTTP/1.1 wire text for a request head plus body.
///
/// `Host` comes first, the remaining headers follow in received order with
/// canonical casing. The body is decoded lossily. Surrounding whitespace is
/// trimmed.
pub fn dump(parts: &Parts, body: &[u8]) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} {} {:?}\r\n", parts.method, request_uri(&parts.uri), parts.version);

    let host = host(&parts.headers, &parts.uri);
    if !host.is_empty() {
        let _ = write!(out, "Host: {host}\r\n");
    }
    for (name, value) in parts.headers.iter() {
        if name == HOST {
            continue;
        }
        let _ = write!(
            out,
            "{}: {}\r\n",
            canonical_header_name(name.as_str()),
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(body));
    out.trim().to_owned()
}

/// `content-type` -> `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Path plus query exactly as requested.
pub fn request_uri(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

pub fn host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// `X-Forwarded-Proto` when a proxy set it, then the URI scheme, else `http`.
pub fn scheme(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http")
        .to_owned()
}

/// Peer IP from the connection, empty when the server did not record it.
pub fn remote_ip(extensions: &Extensions) -> String {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "dump_tests.rs"]
mod tests;
