//! Body framing by `Transfer-Encoding: chunked`, see
//! [RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1).
//!
//! Chunk extensions and trailer fields are validated for shape and dropped.

use std::cmp;
use std::task::Poll;

use bytes::{Buf, BytesMut};
use tracing::trace;
use ChunkedState::*;

use crate::protocol::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    chunk_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// First hex digit of the chunk size, which is mandatory
    SizeStart,
    /// Hex digits of the chunk size
    Size,
    /// Whitespace after the size
    SizeLws,
    /// Ignored `;ext` part of the size line
    Extension,
    SizeLf,
    Data,
    DataCr,
    DataLf,
    /// A trailer field line, ignored
    Trailer,
    TrailerLf,
    EndCr,
    EndLf,
    End,
}

type StepResult = Poll<Result<ChunkedState, ParseError>>;

macro_rules! try_next_byte {
    ($src:ident) => {{
        if $src.is_empty() {
            return Poll::Pending;
        }
        $src.get_u8()
    }};
}

macro_rules! invalid {
    ($reason:expr) => {
        Poll::Ready(Err(ParseError::invalid_body($reason)))
    };
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: SizeStart, chunk_size: 0 }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == End
    }

    /// Appends chunk data to `body`, returning `Ok(true)` once the last chunk
    /// and the trailer section are consumed.
    pub fn decode(&mut self, src: &mut BytesMut, body: &mut BytesMut) -> Result<bool, ParseError> {
        while !self.is_done() {
            if src.is_empty() {
                return Ok(false);
            }

            self.state = match self.step(src, body) {
                Poll::Pending => return Ok(false),
                Poll::Ready(result) => result?,
            };
        }

        trace!(len = body.len(), "finished reading chunked body");
        Ok(true)
    }

    fn step(&mut self, src: &mut BytesMut, body: &mut BytesMut) -> StepResult {
        match self.state {
            SizeStart => read_size_start(src, &mut self.chunk_size),
            Size => read_size(src, &mut self.chunk_size),
            SizeLws => read_size_lws(src),
            Extension => read_extension(src),
            SizeLf => read_size_lf(src, self.chunk_size),
            Data => read_data(src, &mut self.chunk_size, body),
            DataCr => expect_byte(src, b'\r', DataLf, "invalid chunk data CR"),
            DataLf => expect_byte(src, b'\n', SizeStart, "invalid chunk data LF"),
            Trailer => read_trailer(src),
            TrailerLf => expect_byte(src, b'\n', EndCr, "invalid trailer LF"),
            EndCr => read_end_cr(src),
            EndLf => expect_byte(src, b'\n', End, "invalid chunked body end LF"),
            End => Poll::Ready(Ok(End)),
        }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b + 10 - b'a'),
        b'A'..=b'F' => Some(b + 10 - b'A'),
        _ => None,
    }
}

fn read_size_start(src: &mut BytesMut, chunk_size: &mut u64) -> StepResult {
    match hex_value(try_next_byte!(src)) {
        Some(digit) => {
            *chunk_size = u64::from(digit);
            Poll::Ready(Ok(Size))
        }
        None => invalid!("chunk size has no hex digit"),
    }
}

fn read_size(src: &mut BytesMut, chunk_size: &mut u64) -> StepResult {
    let b = try_next_byte!(src);
    let digit = match hex_value(b) {
        Some(digit) => digit,
        None => match b {
            b'\t' | b' ' => return Poll::Ready(Ok(SizeLws)),
            b';' => return Poll::Ready(Ok(Extension)),
            b'\r' => return Poll::Ready(Ok(SizeLf)),
            _ => return invalid!("invalid chunk size"),
        },
    };

    match chunk_size.checked_mul(16).and_then(|size| size.checked_add(u64::from(digit))) {
        Some(size) => {
            *chunk_size = size;
            Poll::Ready(Ok(Size))
        }
        None => invalid!("chunk size overflow"),
    }
}

fn read_size_lws(src: &mut BytesMut) -> StepResult {
    match try_next_byte!(src) {
        // no more digits after whitespace
        b'\t' | b' ' => Poll::Ready(Ok(SizeLws)),
        b';' => Poll::Ready(Ok(Extension)),
        b'\r' => Poll::Ready(Ok(SizeLf)),
        _ => invalid!("invalid chunk size linear white space"),
    }
}

fn read_extension(src: &mut BytesMut) -> StepResult {
    match try_next_byte!(src) {
        b'\r' => Poll::Ready(Ok(SizeLf)),
        b'\n' => invalid!("chunk extension contains a bare LF"),
        _ => Poll::Ready(Ok(Extension)),
    }
}

fn read_size_lf(src: &mut BytesMut, chunk_size: u64) -> StepResult {
    match try_next_byte!(src) {
        b'\n' if chunk_size == 0 => Poll::Ready(Ok(EndCr)),
        b'\n' => Poll::Ready(Ok(Data)),
        _ => invalid!("invalid chunk size LF"),
    }
}

fn read_data(src: &mut BytesMut, chunk_size: &mut u64, body: &mut BytesMut) -> StepResult {
    let len = cmp::min(*chunk_size, src.len() as u64);
    body.extend_from_slice(&src.split_to(len as usize));
    *chunk_size -= len;

    if *chunk_size > 0 {
        Poll::Ready(Ok(Data))
    } else {
        Poll::Ready(Ok(DataCr))
    }
}

fn read_trailer(src: &mut BytesMut) -> StepResult {
    match try_next_byte!(src) {
        b'\r' => Poll::Ready(Ok(TrailerLf)),
        _ => Poll::Ready(Ok(Trailer)),
    }
}

fn read_end_cr(src: &mut BytesMut) -> StepResult {
    match try_next_byte!(src) {
        b'\r' => Poll::Ready(Ok(EndLf)),
        _ => Poll::Ready(Ok(Trailer)),
    }
}

fn expect_byte(src: &mut BytesMut, expected: u8, next: ChunkedState, reason: &'static str) -> StepResult {
    if try_next_byte!(src) == expected {
        Poll::Ready(Ok(next))
    } else {
        invalid!(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(input: &[u8]) -> Result<(bool, BytesMut, BytesMut), ParseError> {
        let mut src = BytesMut::from(input);
        let mut body = BytesMut::new();
        let done = ChunkedDecoder::new().decode(&mut src, &mut body)?;
        Ok((done, body, src))
    }

    #[test]
    fn single_chunk() {
        let (done, body, rest) = decode_all(b"10\r\n1234567890abcdef\r\n0\r\n\r\n").unwrap();
        assert!(done);
        assert_eq!(&body[..], b"1234567890abcdef");
        assert!(rest.is_empty());
    }

    #[test]
    fn multiple_chunks_leave_next_request() {
        let (done, body, rest) = decode_all(b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\nGET / HTTP/1.1\r\n").unwrap();
        assert!(done);
        assert_eq!(&body[..], b"hello, world");
        assert_eq!(&rest[..], b"GET / HTTP/1.1\r\n");
    }

    #[test]
    fn extensions_and_trailers_are_dropped() {
        let (done, body, _) = decode_all(b"5;chunk-ext=value\r\nhello\r\n0\r\nTrailer: value\r\n\r\n").unwrap();
        assert!(done);
        assert_eq!(&body[..], b"hello");
    }

    #[test]
    fn byte_by_byte() {
        let input = b"4\r\nWiki\r\n5 ;x\r\npedia\r\nE\r\n in\r\n\r\nchunks.\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new();
        let mut body = BytesMut::new();
        let mut src = BytesMut::new();
        for b in input {
            assert!(!decoder.is_done());
            src.extend_from_slice(&[*b]);
            decoder.decode(&mut src, &mut body).unwrap();
        }

        assert!(decoder.is_done());
        assert_eq!(&body[..], b"Wikipedia in\r\n\r\nchunks.");
    }

    #[test]
    fn incomplete() {
        let (done, body, _) = decode_all(b"5\r\nhel").unwrap();
        assert!(!done);
        assert_eq!(&body[..], b"hel");
    }

    #[test]
    fn invalid_size() {
        assert!(matches!(decode_all(b"xyz\r\n"), Err(ParseError::InvalidBody { .. })));
        assert!(matches!(decode_all(b"ffffffffffffffffff\r\n"), Err(ParseError::InvalidBody { .. })));
    }

    #[test]
    fn empty_size_line_is_invalid() {
        assert!(matches!(decode_all(b"\r\n"), Err(ParseError::InvalidBody { .. })));
        assert!(matches!(decode_all(b";ext\r\n"), Err(ParseError::InvalidBody { .. })));
        assert!(matches!(decode_all(b"5\r\nhello\r\n\r\n"), Err(ParseError::InvalidBody { .. })));
    }

    #[test]
    fn missing_data_crlf() {
        assert!(matches!(decode_all(b"5\r\nhelloBad"), Err(ParseError::InvalidBody { .. })));
    }

    #[test]
    fn large_chunk() {
        let size = 1024 * 1024;
        let mut data = format!("{size:x}\r\n").into_bytes();
        data.extend(vec![b'A'; size]);
        data.extend(b"\r\n0\r\n\r\n");

        let (done, body, _) = decode_all(&data).unwrap();
        assert!(done);
        assert_eq!(body.len(), size);
        assert!(body.iter().all(|&b| b == b'A'));
    }
}
