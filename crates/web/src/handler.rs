use weft_http::protocol::{Request, Response};

/// Fills in the response for a matched route.
///
/// Any `Fn(&Request, &mut Response)` closure is a handler.
#[cfg_attr(test, mockall::automock)]
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &Request, response: &mut Response);
}

impl<F> RequestHandler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    fn handle(&self, request: &Request, response: &mut Response) {
        self(request, response)
    }
}
