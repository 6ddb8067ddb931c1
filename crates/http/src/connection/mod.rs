//! Drives the codecs over an async byte stream.
//!
//! [`HttpConnection`] reads requests, hands them one at a time to a
//! [`Handler`](crate::handler::Handler) and writes back its responses, in
//! order. Pipelined requests are answered in a single flush.

mod http_connection;

pub use http_connection::HttpConnection;
