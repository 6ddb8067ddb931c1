use http::StatusCode;
use tracing::debug;
use weft_http::protocol::{Request, Response};

use crate::middleware::{Middleware, MiddlewareChain};
use crate::router::Route;

const NOT_FOUND_BODY: &str = "Not Found";

/// The terminal middleware: hands the request to the first matching route.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatch;

impl Middleware for Dispatch {
    fn handle(&self, chain: &mut MiddlewareChain<'_>) {
        let routes = chain.routes();
        let (request, response) = chain.exchange_mut();
        dispatch(routes, request, response);
    }
}

/// Invokes the first route matching `request`, or answers 404.
pub fn dispatch(routes: &[Route], request: &mut Request, response: &mut Response) {
    match routes.iter().find(|route| route.matches(request)) {
        Some(route) => {
            debug!(method = %request.method(), target = request.target(), template = route.template(), "dispatch request");
            route.invoke(request, response);
        }
        None => {
            debug!(method = %request.method(), target = request.target(), "no route matched");
            response.set_status_code(StatusCode::NOT_FOUND);
            response.add_header("Content-Type", "text/plain");
            response.set_body_with_length(NOT_FOUND_BODY);
        }
    }
}
