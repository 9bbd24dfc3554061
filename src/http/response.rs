//! The response builder and its wire-format emitter.
use crate::http::types::{default_status_message, StatusCode, Version};
use std::collections::HashMap;

/// A response under construction.
///
/// Setting the body also sets `Content-Length`. `Content-Type`
/// defaults to `text/plain`. `to_string`/`to_bytes` emit
/// `HTTP/1.1 <code> <message>\r\n`, then headers (iteration order is
/// unspecified), a blank line, then the body.
///
/// ```
/// use corehttp::Response;
///
/// let resp = Response::new().status(200).body("hi");
/// assert!(resp.to_string().starts_with("HTTP/1.1 200 OK\r\n"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    message: Option<String>,
    version: Version,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        Self {
            status: 200,
            message: None,
            version: Version::Http11,
            headers,
            body: Vec::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn status_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        self.headers
            .insert("Content-Length".to_string(), body.len().to_string());
        self.body = body;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn status_line_message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| default_status_message(self.status))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.version.as_str().as_bytes());
        out.extend_from_slice(b" ");
        out.extend_from_slice(self.status.to_string().as_bytes());
        out.extend_from_slice(b" ");
        out.extend_from_slice(self.status_line_message().as_bytes());
        out.extend_from_slice(b"\r\n");
        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Request;

    #[test]
    fn default_content_type_is_text_plain() {
        let resp = Response::new();
        assert_eq!(resp.header_value("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn body_sets_content_length() {
        let resp = Response::new().body("hello");
        assert_eq!(resp.header_value("Content-Length"), Some("5"));
    }

    #[test]
    fn default_status_message_used_when_unset() {
        let resp = Response::new().status(404);
        assert!(resp.to_string().starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn explicit_status_message_overrides_table() {
        let resp = Response::new().status(200).status_message("Yep");
        assert!(resp.to_string().starts_with("HTTP/1.1 200 Yep\r\n"));
    }

    #[test]
    fn parse_emit_idempotence_for_headers() {
        let resp = Response::new()
            .status(200)
            .header("X-Custom", "value")
            .body("payload");
        let parsed = Request::parse(resp.to_bytes().as_slice());
        // The request parser's header loop is format-symmetric with
        // the response emitter, so feeding a response's bytes through
        // it round-trips any header we set explicitly.
        assert_eq!(parsed.header("X-Custom"), Some("value"));
    }
}
