use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::{error, trace};

use crate::ensure;
use crate::protocol::{Response, SendError};

/// Initial buffer size reserved for the status line and headers
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Writes a [`Response`] as `version status reason CRLF`, one `name: value CRLF`
/// line per header, an empty line, then the body verbatim.
///
/// The body is never re-framed: whatever `Content-Length` the response carries
/// is written as is.
#[derive(Debug, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        validate(&item).inspect_err(|e| error!(cause = %e, "refuse to write response"))?;
        write_response(&item, dst);
        trace!(status = item.status(), len = item.body().len(), "response encoded");
        Ok(())
    }
}

/// CR or LF inside the status line or a header would split the message.
fn validate(response: &Response) -> Result<(), SendError> {
    let breaks_line = |s: &str| s.bytes().any(|b| b == b'\r' || b == b'\n');

    ensure!(
        !breaks_line(response.http_version()) && !breaks_line(response.reason()),
        SendError::invalid_response("line break in status line")
    );
    for (name, value) in response.headers() {
        ensure!(!name.is_empty() && !name.contains(':'), SendError::invalid_response(format!("invalid header name {name:?}")));
        ensure!(!breaks_line(name) && !breaks_line(value), SendError::invalid_response(format!("line break in header {name}")));
    }
    Ok(())
}

pub(crate) fn write_response(response: &Response, dst: &mut BytesMut) {
    dst.reserve(INIT_HEADER_SIZE + response.body().len());

    // writing into memory can not fail
    let _ = write!(FastWrite(dst), "{} {} {}\r\n", response.http_version(), response.status(), response.reason());

    for (name, value) in response.headers() {
        dst.put_slice(name.as_bytes());
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }
    dst.put_slice(b"\r\n");
    dst.put_slice(response.body());
}

struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
