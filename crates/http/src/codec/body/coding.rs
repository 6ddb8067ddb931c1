//! Content codings that may appear in a `Transfer-Encoding` list next to the
//! framing (`chunked` or a `Content-Length`).
//!
//! A coding never reads the wire itself: the framing stage collects the raw
//! body and the codings are undone afterwards, last applied first.

use std::io::Read;

use bytes::Bytes;
use flate2::read::{GzDecoder, ZlibDecoder};
use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coding {
    /// Unix `compress` (LZW, the `.Z` format).
    Compress,
    /// zlib-wrapped deflate.
    Deflate,
    Gzip,
}

impl Coding {
    pub fn decode(self, src: &[u8]) -> Result<Bytes, ParseError> {
        trace!(coding = ?self, len = src.len(), "decode body");
        match self {
            Coding::Compress => unlzw(src).map(Bytes::from),
            Coding::Deflate => read_to_end(ZlibDecoder::new(src), "deflate"),
            Coding::Gzip => read_to_end(GzDecoder::new(src), "gzip"),
        }
    }
}

fn read_to_end<R: Read>(mut reader: R, name: &str) -> Result<Bytes, ParseError> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).map_err(|e| ParseError::invalid_body(format!("{name} body: {e}")))?;
    Ok(Bytes::from(out))
}

const LZW_MAGIC: [u8; 2] = [0x1f, 0x9d];
const LZW_BLOCK_MODE: u8 = 0x80;
const LZW_BITS_MASK: u8 = 0x1f;
const LZW_INIT_BITS: u32 = 9;
const LZW_CLEAR: usize = 256;
const LZW_FIRST: usize = 257;

/// Decodes a complete `.Z` stream.
///
/// The compressor emits codes in groups of eight that fill exactly `n_bits`
/// bytes, and pads the current group whenever the code width grows or the
/// table is cleared. The reader skips the same padding.
fn unlzw(src: &[u8]) -> Result<Vec<u8>, ParseError> {
    ensure!(src.len() >= 3 && src[..2] == LZW_MAGIC, ParseError::invalid_body("compress body: bad magic header"));

    let max_bits = u32::from(src[2] & LZW_BITS_MASK);
    let block_mode = src[2] & LZW_BLOCK_MODE != 0;
    ensure!(
        (LZW_INIT_BITS..=16).contains(&max_bits),
        ParseError::invalid_body(format!("compress body: unsupported max bits {max_bits}"))
    );

    let codes = &src[3..];
    let total_bits = codes.len() * 8;
    let table_size = 1usize << max_bits;

    let mut prefix = vec![0u16; table_size];
    let mut suffix: Vec<u8> = (0..table_size).map(|i| (i & 0xff) as u8).collect();
    let mut stack = Vec::new();
    let mut out = Vec::with_capacity(codes.len() * 2);

    let mut n_bits = LZW_INIT_BITS;
    let mut max_code = (1usize << n_bits) - 1;
    let mut free_entry = if block_mode { LZW_FIRST } else { LZW_CLEAR };
    let mut bit_pos = 0usize;
    let mut group_start = 0usize;
    let mut old_code: Option<usize> = None;
    let mut last_char = 0u8;

    let skip_padding = |bit_pos: &mut usize, group_start: &mut usize, n_bits: u32| {
        let group_bits = n_bits as usize * 8;
        let used = (*bit_pos - *group_start) % group_bits;
        if used != 0 {
            *bit_pos += group_bits - used;
        }
        *group_start = *bit_pos;
    };

    loop {
        if free_entry > max_code && n_bits < max_bits {
            skip_padding(&mut bit_pos, &mut group_start, n_bits);
            n_bits += 1;
            max_code = if n_bits == max_bits { table_size } else { (1 << n_bits) - 1 };
        }

        if bit_pos + n_bits as usize > total_bits {
            break;
        }
        let code = read_code(codes, bit_pos, n_bits);
        bit_pos += n_bits as usize;

        let Some(old) = old_code else {
            ensure!(code < 256, ParseError::invalid_body("compress body: invalid first code"));
            last_char = code as u8;
            out.push(last_char);
            old_code = Some(code);
            continue;
        };

        if code == LZW_CLEAR && block_mode {
            free_entry = LZW_FIRST - 1;
            skip_padding(&mut bit_pos, &mut group_start, n_bits);
            n_bits = LZW_INIT_BITS;
            max_code = (1 << n_bits) - 1;
            continue;
        }

        let in_code = code;
        let mut code = code;
        stack.clear();

        // KwKwK: the code about to be defined
        if code >= free_entry {
            ensure!(code == free_entry, ParseError::invalid_body("compress body: corrupt code stream"));
            stack.push(last_char);
            code = old;
        }

        while code >= 256 {
            stack.push(suffix[code]);
            code = usize::from(prefix[code]);
        }
        last_char = suffix[code];
        stack.push(last_char);
        out.extend(stack.iter().rev());

        if free_entry < table_size {
            prefix[free_entry] = old as u16;
            suffix[free_entry] = last_char;
            free_entry += 1;
        }
        old_code = Some(in_code);
    }

    Ok(out)
}

/// Reads `n_bits` (at most 16) bits starting at `bit_pos`, least significant bit first.
#[inline]
fn read_code(codes: &[u8], bit_pos: usize, n_bits: u32) -> usize {
    let index = bit_pos / 8;
    let window = (0..3).fold(0u32, |acc, i| acc | u32::from(codes.get(index + i).copied().unwrap_or(0)) << (8 * i));
    ((window >> (bit_pos % 8)) & ((1 << n_bits) - 1)) as usize
}
