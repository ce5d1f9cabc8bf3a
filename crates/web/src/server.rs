use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use embed_http::connection::{BoxTransport, ConnectionContext, HttpConnection, Transport};
use embed_http::handler::{BoxError, Service};
use embed_http::protocol::{HttpError, RequestEntity};
use embed_http::websocket::Messager;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Level, debug, error, info, warn};

use crate::HttpStream;
use crate::config::ServerConfig;
use crate::resource::StaticResource;
use crate::router::{RouteHandler, Router, RouterBuilder};

/// Picks the [`Messager`] that takes over an upgraded WebSocket connection.
pub trait MessagerFactory: Send + Sync {
    fn messager(&self, request: &RequestEntity, context: &ConnectionContext) -> Option<Box<dyn Messager>>;
}

impl<F> MessagerFactory for F
where
    F: Fn(&RequestEntity, &ConnectionContext) -> Option<Box<dyn Messager>> + Send + Sync,
{
    fn messager(&self, request: &RequestEntity, context: &ConnectionContext) -> Option<Box<dyn Messager>> {
        self(request, context)
    }
}

pub struct ServerBuilder {
    router: RouterBuilder,
    config: ServerConfig,
    address: Option<io::Result<Vec<SocketAddr>>>,
    messager_factory: Option<Box<dyn MessagerFactory>>,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder").field("router", &self.router).field("config", &self.config).finish_non_exhaustive()
    }
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: RouterBuilder::new(), config: ServerConfig::default(), address: None, messager_factory: None }
    }

    /// Replaces the whole configuration. Settings made earlier through the builder are lost.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the configured address with the first address `address` resolves to.
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn web_root(mut self, web_root: impl Into<PathBuf>) -> Self {
        self.config.web_root = web_root.into();
        self
    }

    pub fn max_request_per_connection(mut self, max_request_per_connection: usize) -> Self {
        self.config.max_request_per_connection = max_request_per_connection;
        self
    }

    /// Installs `handler` for exactly `path`; a later call for the same path wins.
    pub fn route(mut self, path: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.router = self.router.route(path, handler);
        self
    }

    pub fn messager_factory(mut self, factory: impl MessagerFactory + 'static) -> Self {
        self.messager_factory = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let mut config = self.config;
        if let Some(address) = self.address {
            let address = address.map_err(|source| ServerBuildError::InvalidAddress { source })?;
            config.address = address.into_iter().next().ok_or(ServerBuildError::MissingAddress)?;
        }

        if config.max_request_per_connection == 0 {
            return Err(ServerBuildError::InvalidRequestCeiling);
        }

        Ok(Server {
            router: self.router.build(),
            resource: StaticResource::new(config.web_root.clone()),
            config,
            messager_factory: self.messager_factory,
        })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address can't be resolved: {source}")]
    InvalidAddress { source: io::Error },
    #[error("address resolved to nothing")]
    MissingAddress,
    #[error("max_request_per_connection must be at least 1")]
    InvalidRequestCeiling,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("web root {} does not exist, create it first", path.display())]
    WebRootMissing { path: PathBuf },
    #[error("can't bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
}

/// Exact routes first, static resources from the web root for everything else, and
/// WebSocket upgrades handed to the messager factory.
pub struct Server {
    router: Router,
    resource: StaticResource,
    config: ServerConfig,
    messager_factory: Option<Box<dyn MessagerFactory>>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("router", &self.router).field("config", &self.config).finish_non_exhaustive()
    }
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Listens on the configured address and serves every accepted connection on its
    /// own task. Only returns on a startup failure.
    pub async fn start(self) -> Result<(), ServerError> {
        if tracing_subscriber::fmt().with_max_level(Level::INFO).try_init().is_err() {
            debug!("global tracing subscriber already installed");
        }

        let web_root = self.config.web_root.clone();
        if !tokio::fs::metadata(&web_root).await.is_ok_and(|metadata| metadata.is_dir()) {
            error!(web_root = %web_root.display(), "web root does not exist");
            return Err(ServerError::WebRootMissing { path: web_root });
        }

        let address = self.config.address;
        let tcp_listener =
            TcpListener::bind(address).await.map_err(|source| ServerError::Bind { address, source })?;
        info!(%address, web_root = %web_root.display(), "start listening");

        let server = Arc::new(self);
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };
            let local_addr = tcp_stream.local_addr().unwrap_or(address);

            let server = server.clone();
            tokio::spawn(async move {
                match server.serve_connection(tcp_stream, local_addr, remote_addr).await {
                    Ok(()) => debug!(remote = %remote_addr, "connection finished"),
                    Err(e) => warn!(remote = %remote_addr, cause = %e, "connection aborted"),
                }
            });
        }
    }

    /// Runs the request loop for one already accepted connection.
    pub async fn serve_connection<S: Transport>(
        self: Arc<Self>,
        io: S,
        local: SocketAddr,
        remote: SocketAddr,
    ) -> Result<(), HttpError> {
        let context =
            ConnectionContext::new(local, remote).with_max_request_per_connection(self.config.max_request_per_connection);
        let io: BoxTransport = Box::new(io);
        HttpConnection::new(io, context).process(self).await
    }
}

#[async_trait]
impl Service for Server {
    async fn dispatch(&self, request: &RequestEntity, stream: &mut HttpStream) -> Result<bool, BoxError> {
        match self.router.at(request.path()) {
            Some(handler) => handler.handle(request, stream).await,
            None => self.resource.serve(request, stream).await,
        }
    }

    fn messager(&self, request: &RequestEntity, context: &ConnectionContext) -> Option<Box<dyn Messager>> {
        self.messager_factory.as_ref().and_then(|factory| factory.messager(request, context))
    }
}
