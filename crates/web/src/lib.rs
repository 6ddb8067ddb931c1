//! Routing and middleware on top of [`weft_http`].
//!
//! A [`Server`] owns an ordered list of [`Route`](router::Route)s and an
//! ordered list of [`Middleware`](middleware::Middleware)s. Every parsed
//! request runs through a fresh [`MiddlewareChain`](middleware::MiddlewareChain)
//! with a fresh response; the chain ends in [`Dispatch`](middleware::Dispatch),
//! which invokes the first route matching the request, or answers 404.
//!
//! # Example
//!
//! ```no_run
//! use weft_http::protocol::{Method, Request, Response};
//! use weft_web::middleware::MiddlewareChain;
//! use weft_web::Server;
//!
//! fn show_article(request: &Request, response: &mut Response) {
//!     let user = request.param("user_id").unwrap_or_default();
//!     let article = request.param("article_id").unwrap_or_default();
//!     response.add_header("Content-Type", "text/plain");
//!     response.set_body_with_length(format!("article {article} of user {user}"));
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = Server::builder().address("127.0.0.1:8080").build().unwrap();
//!
//!     server.add_route(Method::GET, "/users/:user_id/articles/:article_id", show_article).unwrap();
//!     server.add_middleware(|chain: &mut MiddlewareChain<'_>| {
//!         chain.proceed();
//!         chain.response_mut().add_header("Server", "weft");
//!     });
//!
//!     server.start().await;
//! }
//! ```

mod handler;
mod server;

pub mod middleware;
pub mod router;

pub use handler::RequestHandler;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
