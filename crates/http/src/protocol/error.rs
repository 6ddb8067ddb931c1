use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Errors raised while turning raw bytes into a [`Request`](crate::protocol::Request).
///
/// Every variant except [`ParseError::NoRequestAvailable`] is fatal for the
/// connection: the decoder does not try to resynchronize the byte stream.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request: {reason}")]
    MalformedRequest { reason: String },

    #[error("unsupported transfer encoding: {encoding}")]
    UnsupportedEncoding { encoding: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("no request available")]
    NoRequestAvailable,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed<S: ToString>(str: S) -> Self {
        Self::MalformedRequest { reason: str.to_string() }
    }

    pub fn unsupported_encoding<S: ToString>(str: S) -> Self {
        Self::UnsupportedEncoding { encoding: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if this error means the connection can no longer be parsed.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::NoRequestAvailable)
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_response<S: ToString>(str: S) -> Self {
        Self::InvalidResponse { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
