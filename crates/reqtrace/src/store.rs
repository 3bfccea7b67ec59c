// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling buffer of the most recent captured requests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::ErrorCode;
use crate::rolling::RollingIndex;

/// Largest retention count a store accepts, at construction or on reset.
pub const MAX_KEEP: usize = 100_000;

/// Construction-time settings for a [`CaptureStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Service display name shown in the viewer.
    pub name: String,
    /// Number of captures retained.
    pub keep: usize,
    /// Request URIs (path + query) that are never captured.
    pub ignore: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { name: "reqtrace".to_owned(), keep: 20, ignore: vec!["/favicon.ico".to_owned()] }
    }
}

/// Everything the HTTP layer extracted from one inbound request.
///
/// The raw text is serialized before this reaches the store so that the
/// store lock is never held across body I/O.
#[derive(Debug, Clone, Default)]
pub struct CaptureRequest {
    /// Logical handler name (`Default`, `Custom`, ...).
    pub label: String,
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    /// Request-target as received: path plus query.
    pub uri: String,
    pub remote_ip: String,
    pub raw: String,
    /// Set when serializing the request failed; the capture still happens.
    pub error: Option<String>,
}

/// One observed request. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureEntry {
    /// 1-based position in the stream of captures since process start.
    pub seq: u64,
    pub time: DateTime<Local>,
    pub name: String,
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub uri: String,
    pub ip: String,
    pub request: String,
    /// Empty when the request serialized cleanly.
    pub error: String,
}

impl CaptureEntry {
    /// Timestamp in the viewer's display format.
    pub fn display_time(&self) -> String {
        self.time.format("%Y/%m/%d %H:%M:%S%.3f").to_string()
    }
}

/// Point-in-time counters for the health endpoint and viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub capacity: usize,
    pub populated: usize,
    pub cursor: Option<usize>,
    pub total: u64,
    pub ignored: u64,
}

struct Inner {
    index: RollingIndex,
    entries: Vec<Option<Arc<CaptureEntry>>>,
    total: u64,
}

/// Fixed-capacity store of the last N captured requests.
///
/// The cursor, the entry slots and the total counter change together under a
/// single mutex. Critical sections are a cursor bump plus one slot write (or
/// read), so lock hold time does not depend on request size.
pub struct CaptureStore {
    name: String,
    ignores: HashSet<String>,
    ignored: AtomicU64,
    inner: Mutex<Inner>,
}

impl CaptureStore {
    pub fn new(config: StoreConfig) -> Result<Self, ErrorCode> {
        if config.keep > MAX_KEEP {
            return Err(ErrorCode::InvalidConfig);
        }
        let index = RollingIndex::new(config.keep).ok_or(ErrorCode::InvalidConfig)?;
        Ok(Self {
            name: config.name,
            ignores: config.ignore.into_iter().collect(),
            ignored: AtomicU64::new(0),
            inner: Mutex::new(Inner { index, entries: vec![None; config.keep], total: 0 }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `uri` exactly matches a configured ignore entry.
    pub fn is_ignored(&self, uri: &str) -> bool {
        self.ignores.contains(uri)
    }

    /// Record a request and return the slot it was written to.
    ///
    /// Returns `None` without touching the buffer when the request URI is in
    /// the ignore set.
    pub fn capture(&self, req: CaptureRequest) -> Option<usize> {
        self.write(req).map(|(slot, _)| slot)
    }

    /// Like [`capture`](Self::capture) but hands back the entry as written,
    /// which later captures cannot race with.
    pub fn capture_entry(&self, req: CaptureRequest) -> Option<Arc<CaptureEntry>> {
        self.write(req).map(|(_, entry)| entry)
    }

    fn write(&self, req: CaptureRequest) -> Option<(usize, Arc<CaptureEntry>)> {
        if self.is_ignored(&req.uri) {
            self.ignored.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(uri = %req.uri, "ignored request");
            return None;
        }

        let mut inner = self.inner.lock();
        inner.total += 1;
        inner.index = inner.index.next();
        let slot = inner.index.curr()?;
        let entry = Arc::new(CaptureEntry {
            seq: inner.total,
            time: Local::now(),
            name: req.label,
            method: req.method,
            scheme: req.scheme,
            host: req.host,
            path: req.path,
            uri: req.uri,
            ip: req.remote_ip,
            request: req.raw,
            error: req.error.unwrap_or_default(),
        });
        let cell = inner.entries.get_mut(slot)?;
        *cell = Some(Arc::clone(&entry));
        drop(inner);

        tracing::debug!(slot, seq = entry.seq, uri = %entry.uri, "captured request");
        Some((slot, entry))
    }

    /// Entry written `n` captures ago (0 = most recent).
    ///
    /// `n` at or beyond the retention count is [`ErrorCode::OutOfRange`];
    /// `n` within retention but past what has been captured so far is
    /// [`ErrorCode::NoData`].
    pub fn lookup(&self, n: usize) -> Result<Arc<CaptureEntry>, ErrorCode> {
        self.inner.lock().lookup(n)
    }

    /// [`lookup`](Self::lookup) plus the stats it was answered against.
    pub fn lookup_with_stats(
        &self,
        n: usize,
    ) -> (Result<Arc<CaptureEntry>, ErrorCode>, StoreStats) {
        let inner = self.inner.lock();
        (inner.lookup(n), self.stats_of(&inner))
    }

    /// All populated entries, oldest first.
    pub fn snapshot(&self) -> Vec<Arc<CaptureEntry>> {
        self.inner.lock().snapshot()
    }

    /// [`snapshot`](Self::snapshot) plus the stats it was taken against, so
    /// `stats.populated == entries.len()`.
    pub fn snapshot_with_stats(&self) -> (Vec<Arc<CaptureEntry>>, StoreStats) {
        let inner = self.inner.lock();
        (inner.snapshot(), self.stats_of(&inner))
    }

    /// Drop all captures. A non-zero `keep` also changes the retention count.
    ///
    /// `keep` above [`MAX_KEEP`] is [`ErrorCode::BadRequest`] and leaves the
    /// store as it was. The total counter keeps running so sequence numbers
    /// stay unique for the life of the process.
    pub fn reset(&self, keep: usize) -> Result<(), ErrorCode> {
        if keep > MAX_KEEP {
            return Err(ErrorCode::BadRequest);
        }
        let mut inner = self.inner.lock();
        let index = inner.index.reset(keep);
        inner.entries = vec![None; index.capacity()];
        inner.index = index;
        tracing::info!(keep = index.capacity(), "capture store reset");
        Ok(())
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.lock();
        self.stats_of(&inner)
    }

    fn stats_of(&self, inner: &Inner) -> StoreStats {
        StoreStats {
            capacity: inner.index.capacity(),
            populated: inner.index.populated_count(),
            cursor: inner.index.curr(),
            total: inner.total,
            ignored: self.ignored.load(Ordering::Relaxed),
        }
    }
}

impl Inner {
    fn lookup(&self, n: usize) -> Result<Arc<CaptureEntry>, ErrorCode> {
        if n >= self.index.capacity() {
            return Err(ErrorCode::OutOfRange);
        }
        if n >= self.index.populated_count() {
            return Err(ErrorCode::NoData);
        }
        self.index
            .slot_back(n)
            .and_then(|slot| self.entries.get(slot))
            .and_then(Option::clone)
            .ok_or(ErrorCode::NoData)
    }

    fn snapshot(&self) -> Vec<Arc<CaptureEntry>> {
        self.index
            .ordered_slots()
            .filter_map(|slot| self.entries.get(slot).and_then(Option::clone))
            .collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
