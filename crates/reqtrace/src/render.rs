// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTML views over captured requests.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::store::CaptureEntry;
use crate::VERSION;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse}td{padding:2px 12px 2px 0;vertical-align:top}\
td.k{color:#777}pre{background:#f4f4f4;padding:1em;overflow-x:auto}\
.err{color:#b00}nav a{margin-right:.6em}nav a.cur{font-weight:bold}";

/// How a page was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Shown to the caller in response to its own captured request.
    Live,
    /// Shown by the debug viewer when browsing past captures.
    Debug,
}

impl Mode {
    fn label(self) -> &'static str {
        match self {
            Self::Live => "",
            Self::Debug => "::debug",
        }
    }
}

/// Inputs for a single-entry page.
#[derive(Debug, Clone, Copy)]
pub struct EntryPage<'a> {
    pub service: &'a str,
    pub mode: Mode,
    pub debug_path: &'a str,
    pub entry: Option<&'a CaptureEntry>,
    /// Error text to show instead of (or alongside) the entry.
    pub error: Option<&'a str>,
    /// Offsets available in the viewer (`0..populated`).
    pub populated: usize,
    /// Offset currently shown, if any.
    pub current: Option<usize>,
}

/// Render one captured request, or the reason there is none.
pub fn entry_page(page: &EntryPage<'_>) -> String {
    let mut body = String::new();

    if page.mode == Mode::Debug {
        offsets_nav(&mut body, page.debug_path, page.populated, page.current);
    }
    if let Some(error) = page.error.filter(|e| !e.is_empty()) {
        let _ = write!(body, "<p class=\"err\">{}</p>", escape_html(error));
    }

    if let Some(entry) = page.entry {
        body.push_str("<table>");
        row(&mut body, "Seq", &entry.seq.to_string());
        row(&mut body, "Time", &entry.display_time());
        row(&mut body, "Name", &entry.name);
        row(&mut body, "Method", &entry.method);
        row(&mut body, "Host", &entry.host);
        row(&mut body, "Path", &entry.path);
        row(&mut body, "URI", &entry.uri);
        row(&mut body, "IP", &entry.ip);
        if !entry.error.is_empty() {
            row(&mut body, "Error", &entry.error);
        }
        body.push_str("</table>");
        let _ = write!(body, "<pre>{}</pre>", escape_html(&entry.request));

        if page.mode == Mode::Live {
            let url = format!("{}://{}{}/0", entry.scheme, entry.host, page.debug_path);
            let _ = write!(
                body,
                "<p>Debug viewer: <a href=\"{}/0\">{}</a></p>",
                escape_html(page.debug_path),
                escape_html(&url)
            );
        }
    }

    layout(page.service, page.mode, &body)
}

/// Render the capture list, newest first, linking each to its viewer offset.
pub fn index_page(service: &str, debug_path: &str, entries: &[Arc<CaptureEntry>]) -> String {
    let mut body = String::new();
    if entries.is_empty() {
        body.push_str("<p>No data</p>");
    } else {
        body.push_str("<table>");
        for (n, entry) in entries.iter().rev().enumerate() {
            let _ = write!(
                body,
                "<tr><td><a href=\"{}/{n}\">{n}</a></td><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{}</td></tr>",
                escape_html(debug_path),
                escape_html(&entry.display_time()),
                escape_html(&entry.method),
                escape_html(&entry.uri),
                escape_html(&entry.ip),
            );
        }
        body.push_str("</table>");
    }
    layout(service, Mode::Debug, &body)
}

fn offsets_nav(out: &mut String, debug_path: &str, populated: usize, current: Option<usize>) {
    out.push_str("<nav>");
    for n in 0..populated {
        let class = if current == Some(n) { " class=\"cur\"" } else { "" };
        let _ = write!(out, "<a{class} href=\"{}/{n}\">{n}</a>", escape_html(debug_path));
    }
    out.push_str("</nav>");
}

fn row(out: &mut String, key: &str, value: &str) {
    let _ = write!(out, "<tr><td class=\"k\">{key}</td><td>{}</td></tr>", escape_html(value));
}

fn layout(service: &str, mode: Mode, body: &str) -> String {
    let title = escape_html(service);
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}{mode}</title>\
         <style>{STYLE}</style></head><body><h1>{title}{mode}</h1>{body}\
         <footer><small>reqtrace v{VERSION}</small></footer></body></html>",
        mode = mode.label(),
    )
}

/// Escape text for an HTML element body or a double-quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
