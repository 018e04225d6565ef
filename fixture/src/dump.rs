//! Human-readable transcript of request/response traffic.
//!
//! # Design
//! Each recorded side becomes one labelled block: the exchange rendered as
//! wire-style text, trimmed, and every line prefixed with `> ` (request) or
//! `< ` (response) for visual scanning. Blocks are appended in recorded
//! order, separated by exactly one blank line, and never pruned during the
//! fixture's lifetime.
//!
//! Rendering works on the owned snapshot data — never on a body stream —
//! so recording a request leaves its body fully readable for the handler.
//! Rendering is best-effort: a side that cannot be rendered (non-UTF-8
//! body, unprintable header value) records nothing rather than failing the
//! test.

use axum::http::HeaderMap;

use crate::request::RequestSnapshot;
use crate::response::CapturedResponse;

/// Accumulates prefixed request/response dumps into one transcript.
#[derive(Debug, Default)]
pub struct TrafficRecorder {
    transcript: String,
}

impl TrafficRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `REQUEST DUMP:` block for `request`.
    pub fn record_request(&mut self, request: &RequestSnapshot) {
        let Some(rendered) = render_request(request) else {
            return;
        };
        self.append("REQUEST DUMP:", ">", &rendered);
    }

    /// Appends a `RESPONSE DUMP:` block for `response`.
    pub fn record_response(&mut self, response: &CapturedResponse) {
        let Some(rendered) = render_response(response) else {
            return;
        };
        self.append("RESPONSE DUMP:", "<", &rendered);
    }

    /// The accumulated transcript, blocks in recorded order.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    fn append(&mut self, label: &str, prefix: &str, dump: &str) {
        self.transcript.push_str(label);
        self.transcript.push('\n');
        self.transcript.push_str(&format_dump(prefix, dump));
        self.transcript.push_str("\n\n");
    }
}

fn render_request(request: &RequestSnapshot) -> Option<String> {
    let mut text = format!("{} {} HTTP/1.1\n", request.method, request.uri);
    render_headers(&mut text, &request.headers)?;
    text.push('\n');
    text.push_str(&request.body);
    Some(text)
}

fn render_response(response: &CapturedResponse) -> Option<String> {
    let mut text = format!("HTTP/1.1 {}\n", response.status);
    render_headers(&mut text, &response.headers)?;
    text.push('\n');
    text.push_str(std::str::from_utf8(&response.body).ok()?);
    Some(text)
}

fn render_headers(text: &mut String, headers: &HeaderMap) -> Option<()> {
    for (name, value) in headers {
        let value = value.to_str().ok()?;
        text.push_str(name.as_str());
        text.push_str(": ");
        text.push_str(value);
        text.push('\n');
    }
    Some(())
}

/// Trims the dump and prefixes every remaining line with `prefix` + space.
fn format_dump(prefix: &str, dump: &str) -> String {
    dump.trim()
        .lines()
        .map(|line| format!("{prefix} {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
