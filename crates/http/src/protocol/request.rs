use std::collections::HashMap;

use bytes::Bytes;

use crate::protocol::{Headers, Method};

/// Path variables and query parameters of a matched request; last write wins.
pub type Params = HashMap<String, String>;

/// A parsed HTTP request.
///
/// A request is filled stage by stage by the [`RequestDecoder`](crate::codec::RequestDecoder)
/// and afterwards handed, by value, to the application. Routing writes the
/// matched path variables and query parameters into [`Request::params_mut`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: String,
    http_version: String,
    headers: Headers,
    path: String,
    params: Params,
    body: Bytes,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// The request target exactly as it appeared on the start-line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Sets the raw target and derives [`Request::path`] from it.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
        let end = self.target.find(['?', '#']).unwrap_or(self.target.len());
        self.path = self.target[..end].to_owned();
    }

    /// The target without its query and fragment.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    pub fn set_http_version(&mut self, http_version: impl Into<String>) {
        self.http_version = http_version.into();
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn set_headers(&mut self, headers: Headers) {
        self.headers = headers;
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn header_ignore_case(&self, name: &str) -> Option<&str> {
        self.headers.get_ignore_case(name)
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }
}
