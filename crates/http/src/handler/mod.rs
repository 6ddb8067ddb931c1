//! The application side of a connection.
//!
//! A [`Handler`] turns each parsed [`Request`] into a [`Response`], and is told
//! about requests that could not be parsed. Closures become handlers through
//! [`make_handler`]:
//!
//! ```
//! use weft_http::handler::{make_handler, Handler};
//! use weft_http::protocol::{Request, Response};
//!
//! let handler = make_handler(|request: Request| {
//!     let mut response = Response::new();
//!     response.set_body_with_length(format!("you asked for {}", request.path()));
//!     response
//! });
//!
//! let mut request = Request::new();
//! request.set_target("/docs?page=2");
//! assert_eq!(&handler.call(request).body()[..], b"you asked for /docs");
//! ```

use tracing::error;

use crate::protocol::{ParseError, Request, Response};

pub trait Handler: Send + Sync {
    fn call(&self, request: Request) -> Response;

    /// Called once when the connection fails to parse a request, with whatever
    /// part of that request had been parsed.
    fn on_parse_error(&self, partial: &Request, error: &ParseError) {
        error!(cause = %error, method = %partial.method(), target = partial.target(), "failed to parse request");
    }
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Response + Send + Sync,
{
    fn call(&self, request: Request) -> Response {
        (self.f)(request)
    }
}

pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Response + Send + Sync,
{
    HandlerFn { f }
}
