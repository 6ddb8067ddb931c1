use std::mem;

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::codec::header::HeaderFieldDecoder;
use crate::codec::stage::StageDecoder;
use crate::codec::token::{consume_crlf, CR, LF};
use crate::protocol::{Headers, ParseError, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start of a line, which is either the empty line or a new field.
    EmptyLine,
    HeaderField,
    Done,
}

/// Parses the header section up to and including the empty line.
///
/// Headers are collected in a map, so a repeated name keeps its last value.
#[derive(Debug)]
pub struct HeaderFieldsDecoder {
    state: State,
    field: HeaderFieldDecoder,
    headers: Headers,
}

impl HeaderFieldsDecoder {
    pub fn new() -> Self {
        Self { state: State::EmptyLine, field: HeaderFieldDecoder::new(), headers: Headers::new() }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Consumes the empty line ending the section, CRLF or a bare LF.
    fn fetch_empty_line(&mut self, src: &mut BytesMut) -> bool {
        match src.first() {
            Some(&LF) => {
                src.advance(1);
                true
            }
            _ => consume_crlf(src),
        }
    }
}

impl StageDecoder for HeaderFieldsDecoder {
    fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        while !src.is_empty() {
            match self.state {
                State::EmptyLine => {
                    // a lone CR may be the first half of the empty line
                    if src.len() < 2 && src[0] == CR {
                        return Ok(());
                    }
                    if self.fetch_empty_line(src) {
                        trace!(count = self.headers.len(), "header section parsed");
                        self.state = State::Done;
                        return Ok(());
                    }
                    self.state = State::HeaderField;
                }
                State::HeaderField => {
                    self.field.feed(src)?;
                    if !self.field.is_done() {
                        return Ok(());
                    }
                    let (name, value) = self.field.header();
                    self.headers.insert(name, value);
                    self.field.reset();
                    self.state = State::EmptyLine;
                }
                State::Done => return Ok(()),
            }
        }
        Ok(())
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn apply(&mut self, request: &mut Request) {
        request.set_headers(mem::take(&mut self.headers));
    }
}

impl Default for HeaderFieldsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn crlf(s: &str) -> BytesMut {
        BytesMut::from(s.replace('\n', "\r\n").as_bytes())
    }

    #[test]
    fn parse_header_section() {
        let mut src = crlf(indoc! {"
            Host: 127.0.0.1:8080
            User-Agent: curl/7.79.1
            Accept: */*

            body"});

        let mut decoder = HeaderFieldsDecoder::new();
        decoder.feed(&mut src).unwrap();
        assert!(decoder.is_done());
        assert_eq!(&src[..], b"body");

        let mut request = Request::new();
        decoder.apply(&mut request);
        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.header("Host"), Some("127.0.0.1:8080"));
        assert_eq!(request.header("User-Agent"), Some("curl/7.79.1"));
        assert_eq!(request.header("Accept"), Some("*/*"));
    }

    #[test]
    fn empty_section() {
        let mut src = BytesMut::from(&b"\r\n"[..]);
        let mut decoder = HeaderFieldsDecoder::new();
        decoder.feed(&mut src).unwrap();
        assert!(decoder.is_done());
        assert!(decoder.headers().is_empty());
    }

    #[test]
    fn lone_cr_waits_for_more() {
        let mut decoder = HeaderFieldsDecoder::new();

        let mut src = BytesMut::from(&b"A: 1\r\n\r"[..]);
        decoder.feed(&mut src).unwrap();
        assert!(!decoder.is_done());
        assert_eq!(&src[..], b"\r");

        src.extend_from_slice(b"\n");
        decoder.feed(&mut src).unwrap();
        assert!(decoder.is_done());
        assert!(src.is_empty());
    }

    #[test]
    fn byte_by_byte() {
        let input = b"Content-Length: 5\r\nTransfer-Encoding: chunked\r\n\r\n";
        let mut decoder = HeaderFieldsDecoder::new();
        let mut src = BytesMut::new();
        for b in input {
            assert!(!decoder.is_done());
            src.extend_from_slice(&[*b]);
            decoder.feed(&mut src).unwrap();
        }

        assert!(decoder.is_done());
        assert_eq!(decoder.headers().get("Content-Length"), Some("5"));
        assert_eq!(decoder.headers().get("Transfer-Encoding"), Some("chunked"));
    }

    #[test]
    fn duplicate_name_keeps_last_value() {
        let mut src = BytesMut::from(&b"X-A: first\r\nX-A: second\r\n\r\n"[..]);
        let mut decoder = HeaderFieldsDecoder::new();
        decoder.feed(&mut src).unwrap();
        assert_eq!(decoder.headers().len(), 1);
        assert_eq!(decoder.headers().get("X-A"), Some("second"));
    }

    #[test]
    fn bare_lf_lines() {
        let mut src = BytesMut::from(&b"A: 1\nB: 2\n\n"[..]);
        let mut decoder = HeaderFieldsDecoder::new();
        decoder.feed(&mut src).unwrap();
        assert!(decoder.is_done());
        assert_eq!(decoder.headers().len(), 2);
    }

    #[test]
    fn malformed_field() {
        let mut src = BytesMut::from(&b"A: 1\r\nbroken\r\n\r\n"[..]);
        let mut decoder = HeaderFieldsDecoder::new();
        assert!(matches!(decoder.feed(&mut src), Err(ParseError::MalformedRequest { .. })));
    }
}
