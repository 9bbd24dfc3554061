//! The parsed request type and its wire-format parser.
use crate::http::types::{Method, Version};
use std::collections::HashMap;

/// A parsed HTTP request.
///
/// Headers are a case-sensitive `name -> value` mapping; a repeated
/// header name keeps only the last value seen, matching the source
/// parser's line-by-line overwrite behavior.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    pub version: Option<Version>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Request {
    /// Parses a raw request buffer per the wire contract: the request
    /// line is split on whitespace into method/uri/version; header
    /// lines run until a blank line (or a line that is just `"\r"`);
    /// everything after that is the body.
    ///
    /// Parsing is best-effort: a malformed request line or unparsable
    /// bytes yield a `Request` with empty/default fields rather than
    /// an error, matching the "never panic on bad input" contract.
    /// Bytes that are not valid UTF-8 are decoded lossily.
    pub fn parse(raw: &[u8]) -> Self {
        // simdutf8's validating check is the fast path for the common
        // case of well-formed request bytes; only malformed input
        // pays for the allocating lossy replacement.
        let text = match simdutf8::basic::from_utf8(raw) {
            Ok(text) => std::borrow::Cow::Borrowed(text),
            Err(_) => String::from_utf8_lossy(raw),
        };
        let mut lines = text.split("\r\n");

        let mut req = Request::default();

        let Some(request_line) = lines.next() else {
            return req;
        };
        let mut parts = request_line.split_whitespace();
        if let Some(method) = parts.next() {
            req.method = Method::from_str(method);
        }
        if let Some(uri) = parts.next() {
            req.uri = uri.to_string();
        }
        if let Some(version) = parts.next() {
            req.version = Version::from_str(version);
        }

        let mut consumed = request_line.len() + 2;
        for line in lines.by_ref() {
            consumed += line.len() + 2;
            if line.is_empty() || line == "\r" {
                break;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim_end_matches([' ', '\r', '\n']).to_string();
            let value = value.trim_start_matches(' ');
            let value = value.trim_end_matches([' ', '\r', '\n']).to_string();
            req.headers.insert(key, value);
        }

        req.body = text
            .get(consumed.min(text.len())..)
            .unwrap_or("")
            .to_string();
        req
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")
            .or_else(|| self.header("content-length"))
            .and_then(|v| v.parse().ok())
    }

    /// True when this request asks to be upgraded to a WebSocket per
    /// RFC 6455: an `Upgrade: websocket` header (case-insensitively)
    /// plus a present `Sec-WebSocket-Key`.
    pub fn wants_websocket_upgrade(&self) -> bool {
        let upgrade = self
            .header("Upgrade")
            .or_else(|| self.header("upgrade"))
            .unwrap_or_default();
        upgrade.eq_ignore_ascii_case("websocket")
            && (self.header("Sec-WebSocket-Key").is_some()
                || self.header("sec-websocket-key").is_some())
    }
}
