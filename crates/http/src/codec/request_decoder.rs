//! The top-level request parser.
//!
//! [`RequestDecoder`] owns an accumulation buffer and cycles through the
//! [`ParsingStage`]s, handing the buffer to one live stage decoder at a time.
//! Every completed request is queued, so a single read may yield any number
//! of requests and a single request may span any number of reads.
//!
//! ```
//! use weft_http::codec::RequestDecoder;
//!
//! let mut decoder = RequestDecoder::new();
//! decoder.feed(b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n").unwrap();
//!
//! assert_eq!(decoder.pop_front().unwrap().target(), "/a");
//! assert_eq!(decoder.pop_front().unwrap().target(), "/b");
//! assert!(!decoder.is_request_available());
//! ```

use std::collections::VecDeque;
use std::mem;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::stage::{ParsingStage, Stage, StageDecoder};
use crate::ensure;
use crate::protocol::{ParseError, Request};

#[derive(Debug)]
pub struct RequestDecoder {
    buffer: BytesMut,
    current: Request,
    stage: ParsingStage,
    decoder: Stage,
    available: VecDeque<Request>,
    /// A failure held back until the requests completed before it are taken.
    error: Option<ParseError>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            current: Request::new(),
            stage: ParsingStage::StartLine,
            decoder: Stage::StartLine(Default::default()),
            available: VecDeque::new(),
            error: None,
        }
    }

    /// Appends newly arrived bytes and parses as far as they allow.
    ///
    /// After an error the decoder state is undefined and it should be dropped
    /// along with the connection.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        self.buffer.extend_from_slice(bytes);
        self.advance()
    }

    /// The oldest completed request.
    pub fn front(&self) -> Result<&Request, ParseError> {
        self.available.front().ok_or(ParseError::NoRequestAvailable)
    }

    /// Removes and returns the oldest completed request.
    pub fn pop_front(&mut self) -> Result<Request, ParseError> {
        self.available.pop_front().ok_or(ParseError::NoRequestAvailable)
    }

    /// The request under construction, possibly partially populated.
    pub fn current(&self) -> &Request {
        &self.current
    }

    pub fn is_request_available(&self) -> bool {
        !self.available.is_empty()
    }

    pub fn stage(&self) -> ParsingStage {
        self.stage
    }

    /// Whether bytes of a not yet completed request have been received.
    fn is_mid_request(&self) -> bool {
        match &self.decoder {
            Stage::StartLine(decoder) => decoder.is_started() || !self.buffer.is_empty(),
            _ => true,
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        loop {
            self.decoder.feed(&mut self.buffer)?;
            if !self.decoder.is_done() {
                return Ok(());
            }

            self.decoder.apply(&mut self.current);
            if self.stage == ParsingStage::MessageBody {
                let request = mem::take(&mut self.current);
                trace!(method = %request.method(), target = request.target(), "request parsed");
                self.available.push_back(request);
            }

            self.stage = self.stage.next();
            self.decoder = Stage::create(self.stage, &mut self.current)?;
        }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets a `FramedRead` drive the parser: the frame buffer is moved into the
/// accumulation buffer and queued requests are yielded one per call.
impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            self.buffer.unsplit(src.split());
            if let Err(e) = self.advance() {
                self.error = Some(e);
            }
        }

        if let Some(request) = self.available.pop_front() {
            return Ok(Some(request));
        }
        self.error.take().map_or(Ok(None), Err)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let request = self.decode(src)?;
        ensure!(
            request.is_some() || !self.is_mid_request(),
            ParseError::malformed("connection closed before the request was complete")
        );
        Ok(request)
    }
}
