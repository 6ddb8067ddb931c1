use bytes::{Buf, BytesMut};

use crate::codec::token::{consume_whitespaces, CR, LF};
use crate::ensure;
use crate::protocol::ParseError;

/// Consumes the end of a start-line or header line, possibly across several
/// calls: a run of whitespace followed by LF, where a CR must be immediately
/// followed by that LF.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LineEnd {
    last_whitespace: Option<u8>,
}

impl LineEnd {
    /// Returns `Ok(true)` once the terminating LF has been consumed.
    pub(crate) fn consume(&mut self, src: &mut BytesMut, line: &'static str) -> Result<bool, ParseError> {
        if let Some(last) = consume_whitespaces(src) {
            self.last_whitespace = Some(last);
        }

        let Some(&next) = src.first() else {
            return Ok(false);
        };

        ensure!(self.last_whitespace != Some(CR) || next == LF, ParseError::malformed(format!("invalid {line}: CR not followed by LF")));
        ensure!(next == LF, ParseError::malformed(format!("invalid {line}: unexpected byte {next:#04x} before line end")));

        src.advance(1);
        Ok(true)
    }
}
