//! An incremental HTTP/1.1 request parsing engine.
//!
//! This crate turns a byte stream arriving in arbitrary chunks into complete
//! requests, and serializes responses back into bytes. It does not own a
//! socket: a [`connection::HttpConnection`] can drive it over any tokio
//! `AsyncRead`/`AsyncWrite` pair, or the [`codec::RequestDecoder`] can be fed
//! directly.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use weft_http::connection::HttpConnection;
//! use weft_http::handler::make_handler;
//! use weft_http::protocol::{Request, Response};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             match HttpConnection::new(reader, writer).process(handler).await {
//!                 Ok(()) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!("service has error, cause {}, connection shutdown", e),
//!             }
//!         });
//!     }
//! }
//!
//! fn hello_world(request: Request) -> Response {
//!     info!(path = request.path(), "receive request");
//!     let mut response = Response::new();
//!     response.add_header("Content-Type", "text/plain");
//!     response.set_body_with_length("Hello World!\r\n");
//!     response
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: the stage decoders, the top-level [`codec::RequestDecoder`]
//!   and the [`codec::ResponseEncoder`]
//! - [`protocol`]: requests, responses, headers, methods and errors
//! - [`connection`]: the async read/handle/write loop
//! - [`handler`]: the [`handler::Handler`] trait implemented by applications
//!
//! # Parsing model
//!
//! A request goes through three stages: the start-line, the header section
//! and the message body. Each stage decoder consumes what it can from the
//! shared input buffer and leaves the rest. When the body stage completes the
//! request is queued and parsing restarts at the start-line, so several
//! pipelined requests can come out of one read.
//!
//! The body is framed by `Content-Length` or by `Transfer-Encoding`. The
//! latter takes precedence when both are present, and may list the
//! `compress`, `deflate` and `gzip` codings next to `chunked`.
//!
//! # Errors
//!
//! - [`protocol::ParseError`]: the request could not be parsed, the connection
//!   is closed
//! - [`protocol::SendError`]: the response could not be written
//! - [`protocol::HttpError`]: either of the above

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
