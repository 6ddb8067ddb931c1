use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use weft_http::connection::HttpConnection;
use weft_http::handler::Handler;
use weft_http::protocol::{Method, Request, Response};

use crate::handler::RequestHandler;
use crate::middleware::{Dispatch, Middleware, MiddlewareChain};
use crate::router::{Route, RouteError};

const DEFAULT_READ_BUFFER_CAPACITY: usize = 8 * 1024;

pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    read_buffer_capacity: usize,
    log_level: Level,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY, log_level: Level::INFO }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    /// Initial capacity of each connection's read buffer, 8 KiB by default.
    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = capacity;
        self
    }

    /// Maximum level of the log subscriber installed by [`Server::start`].
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }
        if self.read_buffer_capacity == 0 {
            return Err(ServerBuildError::ZeroReadBufferCapacity);
        }

        Ok(Server {
            address,
            read_buffer_capacity: self.read_buffer_capacity,
            log_level: self.log_level,
            routes: Vec::new(),
            middlewares: vec![Arc::new(Dispatch)],
        })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
    #[error("read buffer capacity must be greater than zero")]
    ZeroReadBufferCapacity,
}

/// Routes and middlewares, served over TCP once started.
///
/// The middleware list always ends with [`Dispatch`]: middlewares added later
/// are inserted in front of it, and replacing the list keeps it last.
pub struct Server {
    address: Vec<SocketAddr>,
    read_buffer_capacity: usize,
    log_level: Level,
    routes: Vec<Route>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn add_route(
        &mut self,
        method: Method,
        template: impl Into<String>,
        handler: impl RequestHandler + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.routes.push(Route::new(method, template, handler)?);
        Ok(self)
    }

    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = Route>) -> &mut Self {
        self.routes.extend(routes);
        self
    }

    pub fn set_routes(&mut self, routes: impl IntoIterator<Item = Route>) -> &mut Self {
        self.routes = routes.into_iter().collect();
        self
    }

    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        let dispatch = self.middlewares.len() - 1;
        self.middlewares.insert(dispatch, Arc::new(middleware));
        self
    }

    pub fn add_middlewares(&mut self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> &mut Self {
        let dispatch = self.middlewares.pop();
        self.middlewares.extend(middlewares);
        self.middlewares.extend(dispatch);
        self
    }

    pub fn set_middlewares(&mut self, middlewares: impl IntoIterator<Item = Arc<dyn Middleware>>) -> &mut Self {
        self.middlewares = middlewares.into_iter().collect();
        self.middlewares.push(Arc::new(Dispatch));
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The middleware list, [`Dispatch`] included.
    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    pub async fn start(self) {
        let subscriber = FmtSubscriber::builder().with_max_level(self.log_level).finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            warn!(cause = %e, "a global log subscriber is already set");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return;
            }
        };

        let read_buffer_capacity = self.read_buffer_capacity;
        let handler = Arc::new(self);
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = handler.clone();

            tokio::spawn(async move {
                debug!(%remote_addr, "accept connection");
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_capacity(reader, writer, read_buffer_capacity);
                match connection.process(handler).await {
                    Ok(()) => {
                        info!("finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!("service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

impl Handler for Server {
    fn call(&self, mut request: Request) -> Response {
        let mut response = Response::new();
        MiddlewareChain::new(&self.middlewares, &self.routes, &mut request, &mut response).proceed();
        response
    }
}
