//! Decoder for the request start-line: `method SP request-target SP HTTP-version CRLF`.

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::codec::line_end::LineEnd;
use crate::codec::stage::StageDecoder;
use crate::codec::token::{is_whitespace_delimiter, parse_word, LF};
use crate::ensure;
use crate::protocol::{Method, ParseError, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum State {
    Method,
    Target,
    HttpVersion,
    Trailing,
    Done,
}

/// Parses the start-line word by word, resuming wherever the previous chunk ended.
#[derive(Debug)]
pub struct StartLineDecoder {
    state: State,
    method: Vec<u8>,
    parsed_method: Option<Method>,
    target: Vec<u8>,
    http_version: Vec<u8>,
    line_end: LineEnd,
}

impl StartLineDecoder {
    pub fn new() -> Self {
        Self { state: State::Method, method: Vec::new(), parsed_method: None, target: Vec::new(), http_version: Vec::new(), line_end: LineEnd::default() }
    }

    /// Whether any byte of the start-line, blank lines aside, has been read.
    pub fn is_started(&self) -> bool {
        !self.method.is_empty()
    }

    fn fetch_method(&mut self, src: &mut BytesMut) -> Result<bool, ParseError> {
        if self.state > State::Method {
            return Ok(true);
        }

        // empty lines and stray whitespace received ahead of a request are ignored
        if self.method.is_empty() {
            let blank = src.iter().take_while(|b| is_whitespace_delimiter(**b) || **b == LF).count();
            src.advance(blank);
        }

        if !parse_word(src, &mut self.method, None) {
            return Ok(false);
        }

        ensure!(!self.method.is_empty(), ParseError::malformed("invalid start-line: missing method"));
        let method = Method::from_bytes(&self.method)
            .map_err(|e| ParseError::malformed(format!("invalid start-line method {:?}: {e}", String::from_utf8_lossy(&self.method))))?;
        self.parsed_method = Some(method);
        self.state = State::Target;
        Ok(true)
    }

    fn fetch_target(&mut self, src: &mut BytesMut) -> Result<bool, ParseError> {
        if self.state > State::Target {
            return Ok(true);
        }

        if !parse_word(src, &mut self.target, None) {
            return Ok(false);
        }

        ensure!(!self.target.is_empty(), ParseError::malformed("invalid start-line: missing request target"));
        self.state = State::HttpVersion;
        Ok(true)
    }

    fn fetch_http_version(&mut self, src: &mut BytesMut) -> Result<bool, ParseError> {
        if self.state > State::HttpVersion {
            return Ok(true);
        }

        if !parse_word(src, &mut self.http_version, None) {
            return Ok(false);
        }

        ensure!(!self.http_version.is_empty(), ParseError::malformed("invalid start-line: missing http version"));
        self.state = State::Trailing;
        Ok(true)
    }

    fn fetch_trailing(&mut self, src: &mut BytesMut) -> Result<bool, ParseError> {
        if self.state > State::Trailing {
            return Ok(true);
        }

        if !self.line_end.consume(src, "start-line")? {
            return Ok(false);
        }

        trace!("start-line parsed");
        self.state = State::Done;
        Ok(true)
    }
}

impl Default for StartLineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StageDecoder for StartLineDecoder {
    fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        if src.is_empty() || self.is_done() {
            return Ok(());
        }

        let _ = self.fetch_method(src)?
            && self.fetch_target(src)?
            && self.fetch_http_version(src)?
            && self.fetch_trailing(src)?;
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn apply(&mut self, request: &mut Request) {
        if let Some(method) = self.parsed_method.take() {
            request.set_method(method);
        }
        request.set_target(String::from_utf8_lossy(&self.target));
        request.set_http_version(String::from_utf8_lossy(&self.http_version));
    }
}
