//! Routes and route matching.
//!
//! A [`Route`] pairs an HTTP method and a path template with a
//! [`RequestHandler`]. Routes are tried in registration order and the first
//! one whose method and template both match the request wins.
//!
//! ```
//! use weft_http::protocol::{Request, Response};
//! use weft_web::router::get;
//!
//! let route = get("/users/:id", |request: &Request, response: &mut Response| {
//!     response.set_body_with_length(format!("user {}", request.param("id").unwrap_or_default()));
//! })
//! .unwrap();
//!
//! let mut request = Request::new();
//! request.set_target("/users/7?verbose=true");
//! assert!(route.matches(&mut request));
//! assert_eq!(request.param("id"), Some("7"));
//! assert_eq!(request.param("verbose"), Some("true"));
//! ```

mod route_matcher;

use std::fmt;

use thiserror::Error;
use weft_http::protocol::{Method, Request, Response};

use crate::handler::RequestHandler;
pub use route_matcher::RouteMatcher;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("can't compile route template '{template}': {source}")]
    Compile {
        template: String,
        #[source]
        source: regex::Error,
    },
}

pub struct Route {
    method: Method,
    handler: Option<Box<dyn RequestHandler>>,
    matcher: RouteMatcher,
}

impl Route {
    pub fn new(method: Method, template: impl Into<String>, handler: impl RequestHandler + 'static) -> Result<Self, RouteError> {
        Ok(Self { method, handler: Some(Box::new(handler)), matcher: RouteMatcher::new(template)? })
    }

    /// A route that matches like any other but leaves the response untouched.
    pub fn without_handler(method: Method, template: impl Into<String>) -> Result<Self, RouteError> {
        Ok(Self { method, handler: None, matcher: RouteMatcher::new(template)? })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        self.matcher.template()
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    /// Checks the method, then the target; a successful match binds the
    /// route parameters into the request.
    pub fn matches(&self, request: &mut Request) -> bool {
        if request.method() != &self.method {
            return false;
        }
        let target = request.target().to_owned();
        self.matcher.matches(&target, request.params_mut())
    }

    pub fn invoke(&self, request: &Request, response: &mut Response) {
        if let Some(handler) = &self.handler {
            handler.handle(request, response);
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

macro_rules! method_route {
    ($name:ident, $method:ident) => {
        pub fn $name<H: RequestHandler + 'static>(template: impl Into<String>, handler: H) -> Result<Route, RouteError> {
            Route::new(Method::$method, template, handler)
        }
    };
}

method_route!(get, GET);
method_route!(post, POST);
method_route!(put, PUT);
method_route!(delete, DELETE);
method_route!(head, HEAD);
method_route!(options, OPTIONS);
method_route!(connect, CONNECT);
method_route!(patch, PATCH);
method_route!(trace, TRACE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::MockRequestHandler;

    fn request(method: Method, target: &str) -> Request {
        let mut request = Request::new();
        request.set_method(method);
        request.set_target(target);
        request
    }

    #[test]
    fn method_must_match() {
        let route = get("/users/:id", |_: &Request, _: &mut Response| {}).unwrap();

        let mut request = request(Method::POST, "/users/1");
        assert!(!route.matches(&mut request));
        assert!(request.params().is_empty());

        let mut request = self::request(Method::GET, "/users/1");
        assert!(route.matches(&mut request));
        assert_eq!(request.param("id"), Some("1"));
    }

    #[test]
    fn method_constructors() {
        assert_eq!(post("/", |_: &Request, _: &mut Response| {}).unwrap().method(), &Method::POST);
        assert_eq!(delete("/", |_: &Request, _: &mut Response| {}).unwrap().method(), &Method::DELETE);
        assert_eq!(trace("/", |_: &Request, _: &mut Response| {}).unwrap().method(), &Method::TRACE);
        assert_eq!(patch("/a/:b", |_: &Request, _: &mut Response| {}).unwrap().template(), "/a/:b");
    }

    #[test]
    fn invoke_handler() {
        let mut handler = MockRequestHandler::new();
        handler
            .expect_handle()
            .withf(|request, _| request.param("id") == Some("9"))
            .times(1)
            .returning(|_, response| response.set_status(202, "Accepted"));

        let route = Route::new(Method::GET, "/jobs/:id", handler).unwrap();
        let mut request = request(Method::GET, "/jobs/9");
        let mut response = Response::new();

        assert!(route.matches(&mut request));
        route.invoke(&request, &mut response);
        assert_eq!(response.status(), 202);
    }

    #[test]
    fn route_without_handler_is_a_no_op() {
        let route = Route::without_handler(Method::GET, "/noop").unwrap();
        let mut request = request(Method::GET, "/noop");
        let mut response = Response::new();

        assert!(route.matches(&mut request));
        route.invoke(&request, &mut response);
        assert_eq!(response, Response::new());
    }
}
