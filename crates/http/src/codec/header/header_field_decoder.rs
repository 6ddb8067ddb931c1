//! Decoder for a single header line: `field-name ":" OWS field-value OWS CRLF`.

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::codec::line_end::LineEnd;
use crate::codec::token::{parse_word, parse_words, is_space_delimiter, CR, LF};
use crate::ensure;
use crate::protocol::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum State {
    FieldName,
    FieldValue,
    Trailing,
    Done,
}

/// Parses one header field. Reused for every line of a header section through
/// [`HeaderFieldDecoder::reset`].
#[derive(Debug)]
pub struct HeaderFieldDecoder {
    state: State,
    name: Vec<u8>,
    value: Vec<u8>,
    line_end: LineEnd,
}

impl HeaderFieldDecoder {
    pub fn new() -> Self {
        Self { state: State::FieldName, name: Vec::new(), value: Vec::new(), line_end: LineEnd::default() }
    }

    pub fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        if src.is_empty() || self.is_done() {
            return Ok(());
        }

        let _ = self.fetch_field_name(src)? && self.fetch_field_value(src)? && self.fetch_trailing(src)?;
        Ok(())
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// The parsed `(name, value)` pair, available once [`is_done`](Self::is_done).
    pub fn header(&self) -> (String, String) {
        let value_end = self.value.iter().rposition(|b| !is_space_delimiter(*b)).map_or(0, |i| i + 1);
        (String::from_utf8_lossy(&self.name).into_owned(), String::from_utf8_lossy(&self.value[..value_end]).into_owned())
    }

    /// Clears the parsed data so the decoder can parse the next line.
    pub fn reset(&mut self) {
        self.state = State::FieldName;
        self.name.clear();
        self.value.clear();
        self.line_end = LineEnd::default();
    }

    fn fetch_field_name(&mut self, src: &mut BytesMut) -> Result<bool, ParseError> {
        if self.state > State::FieldName {
            return Ok(true);
        }

        if !parse_word(src, &mut self.name, Some(b':')) {
            return Ok(false);
        }

        ensure!(src.first() == Some(&b':'), ParseError::malformed("invalid header field: expected ':' after field name"));
        ensure!(!self.name.is_empty(), ParseError::malformed("invalid header field: empty field name"));

        // consume separator
        src.advance(1);
        self.state = State::FieldValue;
        Ok(true)
    }

    fn fetch_field_value(&mut self, src: &mut BytesMut) -> Result<bool, ParseError> {
        if self.state > State::FieldValue {
            return Ok(true);
        }

        if !parse_words(src, &mut self.value) {
            return Ok(false);
        }

        // only the line terminator may end a value, a stray VT or FF can not
        ensure!(matches!(src.first(), Some(&CR | &LF)), ParseError::malformed("invalid header field value"));

        self.state = State::Trailing;
        Ok(true)
    }

    fn fetch_trailing(&mut self, src: &mut BytesMut) -> Result<bool, ParseError> {
        if self.state > State::Trailing {
            return Ok(true);
        }

        if !self.line_end.consume(src, "header field")? {
            return Ok(false);
        }

        trace!(name = %String::from_utf8_lossy(&self.name), "header field parsed");
        self.state = State::Done;
        Ok(true)
    }
}

impl Default for HeaderFieldDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"Host: 127.0.0.1:8080\r\nAccept: */*\r\n"[..]);
        decoder.feed(&mut src).unwrap();

        assert!(decoder.is_done());
        assert_eq!(decoder.header(), ("Host".into(), "127.0.0.1:8080".into()));
        assert_eq!(&src[..], b"Accept: */*\r\n");
    }

    #[test]
    fn value_keeps_inner_spaces_and_drops_trailing_ones() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"User-Agent:   Mozilla/5.0 (Macintosh; Intel)  \r\n"[..]);
        decoder.feed(&mut src).unwrap();

        assert!(decoder.is_done());
        assert_eq!(decoder.header().1, "Mozilla/5.0 (Macintosh; Intel)");
    }

    #[test]
    fn empty_value() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"X-Empty:\r\n"[..]);
        decoder.feed(&mut src).unwrap();

        assert!(decoder.is_done());
        assert_eq!(decoder.header(), ("X-Empty".into(), String::new()));
    }

    #[test]
    fn parse_byte_by_byte() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::new();
        for b in b"Accept-Encoding: gzip, deflate\r\n" {
            assert!(!decoder.is_done());
            src.extend_from_slice(&[*b]);
            decoder.feed(&mut src).unwrap();
        }

        assert!(decoder.is_done());
        assert_eq!(decoder.header(), ("Accept-Encoding".into(), "gzip, deflate".into()));
    }

    #[test]
    fn reset_for_reuse() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"A: 1\r\nB: 2\r\n"[..]);
        decoder.feed(&mut src).unwrap();
        assert_eq!(decoder.header(), ("A".into(), "1".into()));

        decoder.reset();
        assert!(!decoder.is_done());
        decoder.feed(&mut src).unwrap();
        assert_eq!(decoder.header(), ("B".into(), "2".into()));
    }

    #[test]
    fn space_before_colon_is_malformed() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"Host : a\r\n"[..]);
        assert!(matches!(decoder.feed(&mut src), Err(ParseError::MalformedRequest { .. })));
    }

    #[test]
    fn missing_colon_is_malformed() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"Host\r\n"[..]);
        assert!(matches!(decoder.feed(&mut src), Err(ParseError::MalformedRequest { .. })));
    }

    #[test]
    fn vertical_tab_in_value_is_malformed() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"Host: a\x0bb\r\n"[..]);
        assert!(matches!(decoder.feed(&mut src), Err(ParseError::MalformedRequest { .. })));
    }

    #[test]
    fn cr_without_lf_is_malformed() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"Host: a\rb"[..]);
        assert!(matches!(decoder.feed(&mut src), Err(ParseError::MalformedRequest { .. })));
    }

    #[test]
    fn cr_after_colon_does_not_swallow_next_line() {
        let mut decoder = HeaderFieldDecoder::new();
        let mut src = BytesMut::from(&b"X:\rY: z\r\n"[..]);
        assert!(matches!(decoder.feed(&mut src), Err(ParseError::MalformedRequest { .. })));
        assert!(!decoder.is_done());
    }
}
