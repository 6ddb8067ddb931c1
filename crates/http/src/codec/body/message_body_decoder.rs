use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::coding::Coding;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::codec::stage::StageDecoder;
use crate::ensure;
use crate::protocol::{ParseError, Request};

const CONTENT_LENGTH: &str = "Content-Length";
const TRANSFER_ENCODING: &str = "Transfer-Encoding";

/// One step of body framing, derived from the request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStage {
    ContentLength,
    Chunked,
    Compress,
    Deflate,
    Gzip,
    Done,
}

impl BodyStage {
    fn from_token(token: &str) -> Result<Self, ParseError> {
        match token.to_ascii_lowercase().as_str() {
            "chunked" => Ok(BodyStage::Chunked),
            "compress" | "x-compress" => Ok(BodyStage::Compress),
            "deflate" => Ok(BodyStage::Deflate),
            "gzip" | "x-gzip" => Ok(BodyStage::Gzip),
            _ => Err(ParseError::unsupported_encoding(token)),
        }
    }

    fn is_framing(self) -> bool {
        matches!(self, BodyStage::ContentLength | BodyStage::Chunked)
    }

    fn coding(self) -> Option<Coding> {
        match self {
            BodyStage::Compress => Some(Coding::Compress),
            BodyStage::Deflate => Some(Coding::Deflate),
            BodyStage::Gzip => Some(Coding::Gzip),
            _ => None,
        }
    }
}

/// The sub-decoder for the stage at the head of the list.
#[derive(Debug)]
enum Framing {
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
}

impl Framing {
    fn for_stage(stage: BodyStage, content_length: u64) -> Self {
        match stage {
            BodyStage::Chunked => Framing::Chunked(ChunkedDecoder::new()),
            _ => Framing::Length(LengthDecoder::new(content_length)),
        }
    }

    fn decode(&mut self, src: &mut BytesMut, body: &mut BytesMut) -> Result<bool, ParseError> {
        match self {
            Framing::Length(decoder) => Ok(decoder.decode(src, body)),
            Framing::Chunked(decoder) => decoder.decode(src, body),
        }
    }
}

/// Decodes the message body by running its framing stages in order.
///
/// Codings listed in `Transfer-Encoding` are remembered while the framing
/// stage collects the raw body, and undone in reverse order once the list
/// reaches [`BodyStage::Done`].
#[derive(Debug)]
pub struct MessageBodyDecoder {
    stages: VecDeque<BodyStage>,
    content_length: u64,
    framing: Option<Framing>,
    codings: Vec<Coding>,
    raw: BytesMut,
    body: Option<Bytes>,
}

impl MessageBodyDecoder {
    /// Builds the stage list from the headers already applied to `request`.
    ///
    /// When both `Content-Length` and `Transfer-Encoding` are present, the
    /// former is removed from the request before anything else happens.
    pub fn from_request(request: &mut Request) -> Result<Self, ParseError> {
        if request.headers().contains_ignore_case(TRANSFER_ENCODING) && request.headers().contains_ignore_case(CONTENT_LENGTH) {
            trace!("transfer-encoding present, dropping content-length");
            request.headers_mut().remove_ignore_case(CONTENT_LENGTH);
        }

        let mut stages = VecDeque::new();
        let mut content_length = 0;

        if let Some(value) = request.header_ignore_case(CONTENT_LENGTH) {
            content_length = value
                .trim()
                .parse::<u64>()
                .map_err(|e| ParseError::invalid_content_length(format!("invalid content-length header {value:?}: {e}")))?;
            stages.push_back(BodyStage::ContentLength);
        }

        if let Some(value) = request.header_ignore_case(TRANSFER_ENCODING) {
            for token in value.split(',').map(str::trim).filter(|token| !token.is_empty()) {
                stages.push_back(BodyStage::from_token(token)?);
            }
        }

        ensure!(
            stages.iter().all(|stage| stage.coding().is_none()) || stages.iter().any(|stage| stage.is_framing()),
            ParseError::invalid_body("content coding without chunked or content-length framing")
        );

        stages.push_back(BodyStage::Done);
        trace!(?stages, content_length, "body stages");

        let mut decoder =
            Self { stages, content_length, framing: None, codings: Vec::new(), raw: BytesMut::new(), body: None };
        // a request without body, or with a zero length one, completes right away
        decoder.advance(&mut BytesMut::new())?;
        Ok(decoder)
    }

    /// The stages still ahead, [`BodyStage::Done`] included.
    pub fn framing_stages(&self) -> impl Iterator<Item = BodyStage> + '_ {
        self.stages.iter().copied()
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    fn advance(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        while self.body.is_none() {
            let stage = self.stages.front().copied().unwrap_or(BodyStage::Done);

            let stage_done = match stage {
                BodyStage::ContentLength | BodyStage::Chunked => {
                    let content_length = self.content_length;
                    let framing = self.framing.get_or_insert_with(|| Framing::for_stage(stage, content_length));
                    framing.decode(src, &mut self.raw)?
                }
                BodyStage::Compress | BodyStage::Deflate | BodyStage::Gzip => {
                    self.codings.extend(stage.coding());
                    true
                }
                BodyStage::Done => {
                    self.finish()?;
                    return Ok(());
                }
            };

            if !stage_done {
                return Ok(());
            }

            trace!(?stage, "body stage done");
            self.stages.pop_front();
            self.framing = None;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        let mut body = self.raw.split().freeze();
        for coding in self.codings.iter().rev() {
            body = coding.decode(&body)?;
        }
        trace!(len = body.len(), "message body parsed");
        self.body = Some(body);
        Ok(())
    }
}

impl StageDecoder for MessageBodyDecoder {
    fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        self.advance(src)
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.body.is_some()
    }

    fn apply(&mut self, request: &mut Request) {
        if let Some(body) = self.body.take() {
            request.set_body(body);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;

    use super::*;

    fn request_with(headers: &[(&str, &str)]) -> Request {
        let mut request = Request::new();
        for (name, value) in headers {
            request.add_header(*name, *value);
        }
        request
    }

    fn chunked(body: &[u8]) -> Vec<u8> {
        let mut wire = format!("{:x}\r\n", body.len()).into_bytes();
        wire.extend_from_slice(body);
        wire.extend_from_slice(b"\r\n0\r\n\r\n");
        wire
    }

    #[test]
    fn no_framing_headers_means_empty_body() {
        let mut request = request_with(&[("Host", "localhost")]);
        let mut decoder = MessageBodyDecoder::from_request(&mut request).unwrap();
        assert!(decoder.is_done());

        decoder.apply(&mut request);
        assert!(request.body().is_empty());
    }

    #[test]
    fn zero_content_length_is_done_immediately() {
        let mut request = request_with(&[("Content-Length", "0")]);
        let decoder = MessageBodyDecoder::from_request(&mut request).unwrap();
        assert!(decoder.is_done());
    }

    #[test]
    fn content_length_boundary() {
        let mut request = request_with(&[("Content-Length", "5")]);
        let mut decoder = MessageBodyDecoder::from_request(&mut request).unwrap();
        assert_eq!(decoder.framing_stages().collect::<Vec<_>>(), [BodyStage::ContentLength, BodyStage::Done]);

        let mut src = BytesMut::from(&b"ab"[..]);
        decoder.feed(&mut src).unwrap();
        assert!(!decoder.is_done());

        src.extend_from_slice(b"cde");
        decoder.feed(&mut src).unwrap();
        assert!(decoder.is_done());

        src.extend_from_slice(b"extra");
        decoder.feed(&mut src).unwrap();
        assert_eq!(&src[..], b"extra");

        decoder.apply(&mut request);
        assert_eq!(&request.body()[..], b"abcde");
    }

    #[test]
    fn transfer_encoding_overrides_content_length() {
        let mut request = request_with(&[("Content-Length", "3"), ("Transfer-Encoding", "chunked")]);
        let mut decoder = MessageBodyDecoder::from_request(&mut request).unwrap();

        assert!(request.header("Content-Length").is_none());
        assert_eq!(decoder.framing_stages().collect::<Vec<_>>(), [BodyStage::Chunked, BodyStage::Done]);

        let mut src = BytesMut::from(&b"5\r\nhello\r\n0\r\n\r\n"[..]);
        decoder.feed(&mut src).unwrap();
        assert!(decoder.is_done());
        decoder.apply(&mut request);
        assert_eq!(&request.body()[..], b"hello");
    }

    #[test]
    fn framing_headers_are_case_insensitive() {
        let mut request = request_with(&[("content-length", "2")]);
        let mut decoder = MessageBodyDecoder::from_request(&mut request).unwrap();
        assert_eq!(decoder.content_length(), 2);

        let mut src = BytesMut::from(&b"ok"[..]);
        decoder.feed(&mut src).unwrap();
        assert!(decoder.is_done());
    }

    #[test]
    fn stage_list_from_tokens() {
        let mut request = request_with(&[("Transfer-Encoding", "Chunked, X-GZIP , deflate,x-compress")]);
        let decoder = MessageBodyDecoder::from_request(&mut request).unwrap();
        assert_eq!(
            decoder.framing_stages().collect::<Vec<_>>(),
            [BodyStage::Chunked, BodyStage::Gzip, BodyStage::Deflate, BodyStage::Compress, BodyStage::Done]
        );
    }

    #[test]
    fn unsupported_encoding() {
        let mut request = request_with(&[("Transfer-Encoding", "br, chunked")]);
        let result = MessageBodyDecoder::from_request(&mut request);
        assert!(matches!(result, Err(ParseError::UnsupportedEncoding { .. })));
    }

    #[test]
    fn invalid_content_length() {
        for value in ["abc", "-1", "1.5"] {
            let mut request = request_with(&[("Content-Length", value)]);
            let result = MessageBodyDecoder::from_request(&mut request);
            match result {
                Err(ParseError::InvalidContentLength { reason }) => {
                    assert!(reason.contains(&format!("{value:?}")), "{reason}");
                    assert!(reason.contains("invalid digit"), "{reason}");
                }
                other => panic!("unexpected result for {value}: {other:?}"),
            }
        }
    }

    #[test]
    fn coding_without_framing() {
        let mut request = request_with(&[("Transfer-Encoding", "gzip")]);
        let result = MessageBodyDecoder::from_request(&mut request);
        assert!(matches!(result, Err(ParseError::InvalidBody { .. })));
    }

    #[test]
    fn gzip_then_chunked() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello compressed world").unwrap();
        let wire = chunked(&encoder.finish().unwrap());

        let mut request = request_with(&[("Transfer-Encoding", "gzip, chunked")]);
        let mut decoder = MessageBodyDecoder::from_request(&mut request).unwrap();

        // byte by byte to cross every stage boundary
        let mut src = BytesMut::new();
        for b in &wire {
            assert!(!decoder.is_done());
            src.extend_from_slice(&[*b]);
            decoder.feed(&mut src).unwrap();
        }
        assert!(decoder.is_done());

        decoder.apply(&mut request);
        assert_eq!(&request.body()[..], b"hello compressed world");
    }

    #[test]
    fn codings_are_undone_last_first() {
        let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
        zlib.write_all(b"layered").unwrap();
        let mut gzip = GzEncoder::new(Vec::new(), Compression::default());
        gzip.write_all(&zlib.finish().unwrap()).unwrap();
        let wire = chunked(&gzip.finish().unwrap());

        let mut request = request_with(&[("Transfer-Encoding", "deflate, gzip, chunked")]);
        let mut decoder = MessageBodyDecoder::from_request(&mut request).unwrap();
        let mut src = BytesMut::from(&wire[..]);
        decoder.feed(&mut src).unwrap();

        decoder.apply(&mut request);
        assert_eq!(&request.body()[..], b"layered");
    }

    #[test]
    fn corrupt_coded_body() {
        let mut request = request_with(&[("Transfer-Encoding", "gzip, chunked")]);
        let mut decoder = MessageBodyDecoder::from_request(&mut request).unwrap();
        let mut src = BytesMut::from(&chunked(b"plain text")[..]);
        assert!(matches!(decoder.feed(&mut src), Err(ParseError::InvalidBody { .. })));
    }
}
