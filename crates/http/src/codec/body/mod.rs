//! Message body decoding.
//!
//! [`MessageBodyDecoder`] derives an ordered list of [`BodyStage`]s from the
//! request headers and runs them one after the other on the shared input
//! buffer: a `Content-Length` or `chunked` stage frames the raw body, and the
//! `compress`, `deflate` and `gzip` stages name the codings to undo on it.

mod chunked_decoder;
mod coding;
mod length_decoder;
mod message_body_decoder;

pub use chunked_decoder::ChunkedDecoder;
pub use coding::Coding;
pub use length_decoder::LengthDecoder;
pub use message_body_decoder::{BodyStage, MessageBodyDecoder};
