//! The middleware pipeline run for every request.
//!
//! Middlewares are invoked in order through a [`MiddlewareChain`]. Each one
//! decides whether the rest of the chain runs by calling
//! [`MiddlewareChain::proceed`], and may inspect or change the response once
//! `proceed` returns. The last middleware of a server is always [`Dispatch`].
//!
//! ```
//! use weft_http::protocol::{Request, Response};
//! use weft_web::middleware::MiddlewareChain;
//! use weft_web::middleware::Middleware;
//! use std::sync::Arc;
//!
//! let timing: Arc<dyn Middleware> = Arc::new(|chain: &mut MiddlewareChain<'_>| {
//!     chain.proceed();
//!     chain.response_mut().add_header("X-Handled-By", "weft");
//! });
//!
//! let (mut request, mut response) = (Request::new(), Response::new());
//! MiddlewareChain::new(&[timing], &[], &mut request, &mut response).proceed();
//! assert_eq!(response.header("X-Handled-By"), Some("weft"));
//! ```

mod dispatch;

use std::sync::Arc;

use weft_http::protocol::{Request, Response};

use crate::router::Route;
pub use dispatch::{dispatch, Dispatch};

pub trait Middleware: Send + Sync {
    fn handle(&self, chain: &mut MiddlewareChain<'_>);
}

impl<F> Middleware for F
where
    F: Fn(&mut MiddlewareChain<'_>) + Send + Sync,
{
    fn handle(&self, chain: &mut MiddlewareChain<'_>) {
        self(chain)
    }
}

/// One run of the middleware list over a single request and its response.
///
/// The chain borrows both for its whole run, so every middleware sees the
/// changes made by the ones before it.
pub struct MiddlewareChain<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    routes: &'a [Route],
    cursor: usize,
    request: &'a mut Request,
    response: &'a mut Response,
}

impl<'a> MiddlewareChain<'a> {
    pub fn new(
        middlewares: &'a [Arc<dyn Middleware>],
        routes: &'a [Route],
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> Self {
        Self { middlewares, routes, cursor: 0, request, response }
    }

    /// Invokes the next middleware, if any. Returns once it, and everything
    /// it let run after it, has returned.
    pub fn proceed(&mut self) {
        let middlewares = self.middlewares;
        let Some(middleware) = middlewares.get(self.cursor) else {
            return;
        };
        self.cursor += 1;
        middleware.handle(self);
    }

    /// The number of middlewares already invoked.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn routes(&self) -> &'a [Route] {
        self.routes
    }

    pub fn request(&self) -> &Request {
        &*self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut *self.request
    }

    pub fn response(&self) -> &Response {
        &*self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut *self.response
    }

    /// Both sides of the exchange at once.
    pub fn exchange_mut(&mut self) -> (&mut Request, &mut Response) {
        (&mut *self.request, &mut *self.response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn run(middlewares: &[Arc<dyn Middleware>]) -> Response {
        let mut request = Request::new();
        let mut response = Response::new();
        MiddlewareChain::new(middlewares, &[], &mut request, &mut response).proceed();
        response
    }

    fn recording(log: &Arc<Mutex<Vec<String>>>, name: &'static str, proceed: bool) -> Arc<dyn Middleware> {
        let log = log.clone();
        Arc::new(move |chain: &mut MiddlewareChain<'_>| {
            log.lock().unwrap().push(format!("{name} before"));
            if proceed {
                chain.proceed();
            }
            log.lock().unwrap().push(format!("{name} after"));
        })
    }

    #[test]
    fn runs_in_order_and_unwinds() {
        let log = Arc::new(Mutex::new(Vec::new()));
        run(&[recording(&log, "a", true), recording(&log, "b", true), recording(&log, "c", true)]);

        assert_eq!(*log.lock().unwrap(), ["a before", "b before", "c before", "c after", "b after", "a after"]);
    }

    #[test]
    fn short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first_log = log.clone();
        let first: Arc<dyn Middleware> = Arc::new(move |chain: &mut MiddlewareChain<'_>| {
            chain.proceed();
            // sees what the second one did
            first_log.lock().unwrap().push(format!("first after, status {}", chain.response().status()));
        });
        let second: Arc<dyn Middleware> = Arc::new(|chain: &mut MiddlewareChain<'_>| {
            chain.response_mut().set_status(401, "Unauthorized");
        });

        let response = run(&[first, second, recording(&log, "third", true)]);

        assert_eq!(*log.lock().unwrap(), ["first after, status 401"]);
        assert_eq!(response.status(), 401);
    }

    #[test]
    fn empty_chain() {
        assert_eq!(run(&[]), Response::new());
    }

    #[test]
    fn proceed_after_the_end_is_a_no_op() {
        let calls = Arc::new(Mutex::new(0));
        let counted = calls.clone();
        let twice: Arc<dyn Middleware> = Arc::new(move |chain: &mut MiddlewareChain<'_>| {
            *counted.lock().unwrap() += 1;
            chain.proceed();
            chain.proceed();
            assert_eq!(chain.position(), 1);
        });

        run(&[twice]);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn middlewares_share_the_request() {
        let tag: Arc<dyn Middleware> = Arc::new(|chain: &mut MiddlewareChain<'_>| {
            chain.request_mut().add_header("X-User", "alice");
            chain.proceed();
        });
        let read: Arc<dyn Middleware> = Arc::new(|chain: &mut MiddlewareChain<'_>| {
            let user = chain.request().header("X-User").unwrap_or("nobody").to_owned();
            chain.response_mut().set_body_with_length(user);
        });

        assert_eq!(&run(&[tag, read]).body()[..], b"alice");
    }
}
