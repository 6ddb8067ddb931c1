//! Body framing by a declared `Content-Length`.

use std::cmp;

use bytes::BytesMut;
use tracing::trace;

/// Moves exactly `length` bytes from the input into the body, across as many
/// calls as it takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// Bytes still missing from the body.
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Consumes `min(remaining, src.len())` bytes and returns whether the body is complete.
    pub fn decode(&mut self, src: &mut BytesMut, body: &mut BytesMut) -> bool {
        if self.is_done() || src.is_empty() {
            return self.is_done();
        }

        let len = cmp::min(self.remaining, src.len() as u64);
        let bytes = src.split_to(len as usize);
        body.unsplit(bytes);

        self.remaining -= len;
        trace!(len, remaining = self.remaining, "read body bytes");
        self.is_done()
    }
}
