//! Wire codecs for HTTP/1.1.
//!
//! Requests are parsed incrementally by [`RequestDecoder`], which composes
//! three stage decoders:
//!
//! - the start-line decoder (`method target version`)
//! - the header section decoders in [`header`]
//! - the message body decoders in [`body`], covering `Content-Length`,
//!   `chunked` and the `compress`, `deflate` and `gzip` codings
//!
//! All of them consume from one shared [`BytesMut`](bytes::BytesMut): what
//! they consume is split off its front, what they leave stays for the next
//! call. This is what makes parsing independent of how the input is chunked.
//!
//! Responses are serialized by [`ResponseEncoder`].
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::{Decoder, Encoder};
//! use weft_http::codec::{RequestDecoder, ResponseEncoder};
//! use weft_http::protocol::Response;
//!
//! let mut src = BytesMut::from(&b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n"[..]);
//! let request = RequestDecoder::new().decode(&mut src).unwrap().unwrap();
//! assert_eq!(request.path(), "/hello");
//!
//! let mut response = Response::new();
//! response.set_body_with_length("hi");
//! let mut dst = BytesMut::new();
//! ResponseEncoder::new().encode(response, &mut dst).unwrap();
//! assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi");
//! ```

pub mod body;
pub mod header;
mod line_end;
mod request_decoder;
mod response_encoder;
mod stage;
mod start_line_decoder;
mod token;

pub use request_decoder::RequestDecoder;
pub(crate) use response_encoder::write_response;
pub use response_encoder::ResponseEncoder;
pub use stage::{ParsingStage, StageDecoder};
pub use start_line_decoder::StartLineDecoder;
