use bytes::BytesMut;
use tracing::trace;

use crate::codec::body::MessageBodyDecoder;
use crate::codec::header::HeaderFieldsDecoder;
use crate::codec::start_line_decoder::StartLineDecoder;
use crate::protocol::{ParseError, Request};

/// The capability shared by every stage decoder.
///
/// `feed` consumes what it can from `src` and leaves the rest in place; it is a
/// no-op once the decoder is done. `apply` writes the parsed result into the
/// request being built.
pub trait StageDecoder {
    fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError>;

    fn is_done(&self) -> bool;

    fn apply(&mut self, request: &mut Request);
}

/// The three coarse phases of request parsing, cycling back to the start-line
/// once the body is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsingStage {
    StartLine,
    HeaderFields,
    MessageBody,
}

impl ParsingStage {
    pub fn next(self) -> Self {
        match self {
            ParsingStage::StartLine => ParsingStage::HeaderFields,
            ParsingStage::HeaderFields => ParsingStage::MessageBody,
            ParsingStage::MessageBody => ParsingStage::StartLine,
        }
    }
}

/// The live decoder of the current [`ParsingStage`].
#[derive(Debug)]
pub(crate) enum Stage {
    StartLine(StartLineDecoder),
    HeaderFields(HeaderFieldsDecoder),
    MessageBody(MessageBodyDecoder),
}

impl Stage {
    /// Builds a fresh decoder for `stage`.
    ///
    /// The body decoder derives its framing from the headers already applied
    /// to `request`, and may remove `Content-Length` from it.
    pub(crate) fn create(stage: ParsingStage, request: &mut Request) -> Result<Self, ParseError> {
        trace!(?stage, "create stage decoder");
        Ok(match stage {
            ParsingStage::StartLine => Stage::StartLine(StartLineDecoder::new()),
            ParsingStage::HeaderFields => Stage::HeaderFields(HeaderFieldsDecoder::new()),
            ParsingStage::MessageBody => Stage::MessageBody(MessageBodyDecoder::from_request(request)?),
        })
    }
}

impl StageDecoder for Stage {
    fn feed(&mut self, src: &mut BytesMut) -> Result<(), ParseError> {
        match self {
            Stage::StartLine(decoder) => decoder.feed(src),
            Stage::HeaderFields(decoder) => decoder.feed(src),
            Stage::MessageBody(decoder) => decoder.feed(src),
        }
    }

    fn is_done(&self) -> bool {
        match self {
            Stage::StartLine(decoder) => decoder.is_done(),
            Stage::HeaderFields(decoder) => decoder.is_done(),
            Stage::MessageBody(decoder) => decoder.is_done(),
        }
    }

    fn apply(&mut self, request: &mut Request) {
        match self {
            Stage::StartLine(decoder) => decoder.apply(request),
            Stage::HeaderFields(decoder) => decoder.apply(request),
            Stage::MessageBody(decoder) => decoder.apply(request),
        }
    }
}
