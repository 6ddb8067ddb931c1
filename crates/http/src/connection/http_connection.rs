use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, trace};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::HttpError;

const DEFAULT_READ_CAPACITY: usize = 8 * 1024;

#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_capacity(reader, writer, DEFAULT_READ_CAPACITY)
    }

    pub fn with_capacity(reader: R, writer: W, read_capacity: usize) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), read_capacity),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Serves requests until the peer closes the stream.
    ///
    /// A parse error is reported to [`Handler::on_parse_error`] and ends the
    /// connection without a response.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(request)) => {
                    trace!(method = %request.method(), target = request.target(), "receive request");
                    let response = handler.call(request);

                    if self.framed_read.decoder().is_request_available() {
                        // more pipelined requests are ready, flush once they are all answered
                        self.framed_write.feed(response).await?;
                    } else {
                        self.framed_write.send(response).await?;
                    }
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't receive next request");
                    handler.on_parse_error(self.framed_read.decoder().current(), &e);
                    return Err(e.into());
                }

                None => {
                    info!("can't read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }
}
