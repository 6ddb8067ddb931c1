//! HTTP data model and error types.
//!
//! - [`Request`]: a parsed request, filled stage by stage by the decoder
//! - [`Response`]: a response under construction, serialized by the encoder
//! - [`Headers`]: case-preserving, overwrite-on-duplicate header fields
//! - [`Method`]: re-exported `http::Method`; extension tokens are kept verbatim
//! - [`ParseError`], [`SendError`], [`HttpError`]: error types

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

mod header;
pub use header::Headers;

pub use http::Method;

mod request;
pub use request::Params;
pub use request::Request;

mod response;
pub use response::Response;
