//! Byte-level consumers shared by the stage decoders.
//!
//! Every consumer works on the connection buffer itself: consumed bytes are
//! split off the front of the [`BytesMut`] and whatever is left stays for the
//! next call. A token that is not terminated yet is handed back whole, so the
//! caller appends it to its accumulator and resumes once more bytes arrive.

use bytes::{Buf, BytesMut};

pub(crate) const SP: u8 = b' ';
pub(crate) const HTAB: u8 = b'\t';
pub(crate) const VT: u8 = 0x0b;
pub(crate) const FF: u8 = 0x0c;
pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';

/// Space class: SP and HTAB.
#[inline]
pub(crate) fn is_space_delimiter(b: u8) -> bool {
    b == SP || b == HTAB
}

/// Whitespace class: SP, HTAB, VT, FF and CR.
#[inline]
pub(crate) fn is_whitespace_delimiter(b: u8) -> bool {
    matches!(b, SP | HTAB | VT | FF | CR)
}

/// A token also ends at a bare LF, so lines terminated by LF alone reach the
/// terminator check instead of running into the next line.
#[inline]
fn is_token_delimiter(b: u8) -> bool {
    is_whitespace_delimiter(b) || b == LF
}

#[inline]
pub(crate) fn is_crlf(buf: &[u8]) -> bool {
    buf.len() >= 2 && buf[0] == CR && buf[1] == LF
}

/// Consumes a leading CRLF, returns false without consuming anything otherwise.
pub(crate) fn consume_crlf(buf: &mut BytesMut) -> bool {
    if !is_crlf(buf) {
        return false;
    }
    buf.advance(2);
    true
}

/// Consumes the leading run of whitespace and returns the last byte of it.
pub(crate) fn consume_whitespaces(buf: &mut BytesMut) -> Option<u8> {
    let count = buf.iter().take_while(|b| is_whitespace_delimiter(**b)).count();
    if count == 0 {
        return None;
    }
    let last = buf[count - 1];
    buf.advance(count);
    Some(last)
}

/// Consumes the leading run of spaces and tabs, returning how many were dropped.
pub(crate) fn consume_spaces(buf: &mut BytesMut) -> usize {
    let count = buf.iter().take_while(|b| is_space_delimiter(**b)).count();
    buf.advance(count);
    count
}

/// Consumes a token ending before the first whitespace or `ending` byte.
///
/// Returns the token and whether its end was seen. When no delimiter is in the
/// buffer the whole buffer is returned and the token is incomplete.
pub(crate) fn consume_word(buf: &mut BytesMut, ending: Option<u8>) -> (BytesMut, bool) {
    match buf.iter().position(|b| is_token_delimiter(*b) || Some(*b) == ending) {
        Some(end) => (buf.split_to(end), true),
        None => (buf.split(), false),
    }
}

/// Like [`consume_word`] but spaces and tabs belong to the token, which makes
/// it suitable for header values.
pub(crate) fn consume_words(buf: &mut BytesMut) -> (BytesMut, bool) {
    match buf.iter().position(|b| is_token_delimiter(*b) && !is_space_delimiter(*b)) {
        Some(end) => (buf.split_to(end), true),
        None => (buf.split(), false),
    }
}

/// Appends the next word to `out`, returning true once the word is complete.
///
/// Leading whitespace is dismissed only while `out` is still empty, that is
/// before the first byte of the word has been seen.
pub(crate) fn parse_word(buf: &mut BytesMut, out: &mut Vec<u8>, ending: Option<u8>) -> bool {
    if out.is_empty() {
        consume_whitespaces(buf);
    }

    let (word, complete) = consume_word(buf, ending);
    out.extend_from_slice(&word);
    complete
}

/// Appends the next run of words (spaces included) to `out`, returning true
/// once the run is complete.
///
/// Only spaces and tabs are dismissed ahead of the run; a CR, VT or FF stays
/// in the buffer for the caller's terminator check.
pub(crate) fn parse_words(buf: &mut BytesMut, out: &mut Vec<u8>) -> bool {
    if out.is_empty() {
        consume_spaces(buf);
    }

    let (words, complete) = consume_words(buf);
    out.extend_from_slice(&words);
    complete
}
