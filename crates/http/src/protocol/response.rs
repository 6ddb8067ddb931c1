use bytes::Bytes;
use http::StatusCode;

use crate::protocol::Headers;

const CONTENT_LENGTH: &str = "Content-Length";

/// An HTTP response under construction.
///
/// A fresh response is `HTTP/1.1 200 OK` with no headers and an empty body.
/// Nothing is added implicitly when it is serialized: handlers that send a body
/// are expected to set `Content-Length`, see [`Response::set_body_with_length`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    http_version: String,
    status: u16,
    reason: String,
    headers: Headers,
    body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self { http_version: "HTTP/1.1".into(), status: 200, reason: "OK".into(), headers: Headers::new(), body: Bytes::new() }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a response whose reason phrase is the canonical one for `status`.
    pub fn with_status(status: StatusCode) -> Self {
        let mut response = Self::new();
        response.set_status_code(status);
        response
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    pub fn set_http_version(&mut self, http_version: impl Into<String>) {
        self.http_version = http_version.into();
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_status(&mut self, status: u16, reason: impl Into<String>) {
        self.status = status;
        self.reason = reason.into();
    }

    pub fn set_status_code(&mut self, status: StatusCode) {
        self.set_status(status.as_u16(), status.canonical_reason().unwrap_or_default());
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replaces the body, leaving the headers untouched.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Replaces the body and sets a matching `Content-Length` header.
    pub fn set_body_with_length(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
        self.headers.insert(CONTENT_LENGTH, self.body.len().to_string());
    }

    /// Serializes the response into its wire form.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = bytes::BytesMut::new();
        crate::codec::write_response(self, &mut dst);
        dst.freeze()
    }
}
