//! The acceptor: binds a listener and spawns one connection task per
//! accepted socket. `Handler` is the plugin contract handler authors
//! implement; re-exported here for discoverability alongside `Server`.
use crate::config::Config;
use crate::errors::{IoError, ServerError};
use crate::handlers::catalog::{resolve_default_handler, HandlerCatalog};
pub use crate::handlers::catalog::Handler;
use crate::logger::Logger;
use crate::server::connection::{self, ConnectionContext};
use crate::server::worker_pool::WorkerPool;
use crate::ws::pool::WebSocketPool;
use arc_swap::ArcSwap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};

/// An HTTP server bound to a listening socket, ready to accept
/// connections.
///
/// ```no_run
/// use corehttp::{Server, Handler, HandlerCatalog, Request, Response};
/// use std::sync::Arc;
///
/// struct Hello;
/// impl Handler for Hello {
///     fn handle(&self, _: &Request) -> Response {
///         Response::new().status(200).body("hi")
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> std::io::Result<()> {
/// Server::builder()
///     .default_handler(Arc::new(Hello))
///     .bind("127.0.0.1:0")
///     .await?
///     .launch()
///     .await;
/// # Ok(())
/// # }
/// ```
pub struct Server {
    listener: TcpListener,
    ctx: ConnectionContext,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The swappable default-handler slot, for wiring
    /// [`crate::CommandExecutor::register_reload`] so `reload` can
    /// rebind it alongside the catalog.
    pub fn default_handler_slot(&self) -> Arc<ArcSwap<dyn Handler>> {
        self.ctx.default_handler.clone()
    }

    /// Accepts indefinitely, spawning one reactor task per connection.
    /// Accept errors are logged and accepting continues (H3: a bad
    /// accept never stalls the loop).
    pub async fn launch(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        connection::run(stream, ctx).await;
                    });
                }
                Err(err) => {
                    self.ctx.logger.error(ServerError::Accept(IoError(err)));
                }
            }
        }
    }

    /// Like [`Server::launch`], but stops accepting as soon as
    /// `shutdown` resolves (SIGINT/SIGTERM, the `exit` command, or any
    /// other future the embedder chooses). Connections already
    /// in-flight are left to finish; this only stops new accepts.
    pub async fn launch_with_shutdown(self, shutdown: impl std::future::Future<Output = ()>) {
        tokio::select! {
            _ = self.launch() => {},
            _ = shutdown => {
                self.ctx.logger.log("shutdown signal received, no longer accepting connections");
            }
        }
    }
}

/// Resolves on `SIGINT` or (on Unix) `SIGTERM`, whichever fires first.
/// A convenience for [`Server::launch_with_shutdown`]; embedders that
/// want different shutdown triggers can pass their own future instead.
pub async fn ctrl_c_or_sigterm() {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Builder for [`Server`]. `default_handler` is the one required
/// field; everything else defaults to an empty catalog, a default
/// [`Config`], a fresh logger, a 4-thread worker pool, and an empty
/// WebSocket pool.
pub struct ServerBuilder {
    catalog: Arc<HandlerCatalog>,
    default_handler: Option<Arc<dyn Handler>>,
    config: Config,
    workers: Arc<WorkerPool>,
    logger: Arc<Logger>,
    ws_pool: Arc<WebSocketPool>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            catalog: Arc::new(HandlerCatalog::new()),
            default_handler: None,
            config: Config::default(),
            workers: Arc::new(WorkerPool::default()),
            logger: Arc::new(Logger::new()),
            ws_pool: Arc::new(WebSocketPool::new()),
        }
    }
}

impl ServerBuilder {
    pub fn catalog(mut self, catalog: Arc<HandlerCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the built-in fallback handler, used as-is when
    /// `config.default_request_handler` is set, or as the fallback if
    /// `config.custom_default_handler` names a catalog entry that
    /// isn't registered. **Required.**
    pub fn default_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.default_handler = Some(handler);
        self
    }

    /// Sets the configuration consulted at `bind` time to resolve the
    /// default handler (see [`resolve_default_handler`]). Defaults to
    /// [`Config::default`].
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn workers(mut self, workers: Arc<WorkerPool>) -> Self {
        self.workers = workers;
        self
    }

    pub fn logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn ws_pool(mut self, ws_pool: Arc<WebSocketPool>) -> Self {
        self.ws_pool = ws_pool;
        self
    }

    /// Binds the listener and finalizes the builder. The configured
    /// default handler is resolved against `config` at this point
    /// (see [`resolve_default_handler`]); `reload` re-runs the same
    /// resolution later against a freshly rebuilt catalog.
    ///
    /// # Panics
    ///
    /// Panics if [`ServerBuilder::default_handler`] was never called.
    #[track_caller]
    pub async fn bind(self, addr: impl ToSocketAddrs) -> std::io::Result<Server> {
        let listener = TcpListener::bind(addr).await?;
        let builtin = self
            .default_handler
            .expect("`default_handler` must be set before `bind`");
        let resolved = resolve_default_handler(&self.config, &self.catalog, builtin, &self.logger);
        let ctx = ConnectionContext {
            catalog: self.catalog,
            default_handler: Arc::new(ArcSwap::new(resolved)),
            workers: self.workers,
            logger: self.logger,
            ws_pool: self.ws_pool,
        };
        Ok(Server { listener, ctx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{request::Request, response::Response};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    struct Hello;
    impl Handler for Hello {
        fn handle(&self, _req: &Request) -> Response {
            Response::new().status(200).body("hi")
        }
    }

    #[tokio::test]
    async fn end_to_end_request_round_trip() {
        let server = Server::builder()
            .default_handler(Arc::new(Hello))
            .bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.launch());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut resp = Vec::new();
        stream.read_to_end(&mut resp).await.unwrap();
        let text = String::from_utf8_lossy(&resp);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("hi"));
    }

    #[tokio::test]
    #[should_panic(expected = "default_handler")]
    async fn bind_panics_without_a_default_handler() {
        let _ = Server::builder().bind("127.0.0.1:0").await;
    }

    struct ApiRoute;
    impl Handler for ApiRoute {
        fn handle(&self, _req: &Request) -> Response {
            Response::new().status(200).body("api")
        }
    }

    #[tokio::test]
    async fn config_picks_a_named_catalog_entry_as_the_default_handler() {
        let catalog = Arc::new(HandlerCatalog::new());
        catalog.insert("api", Arc::new(ApiRoute));
        let mut config = Config::default();
        config.default_request_handler = false;
        config.custom_default_handler = "api".to_string();

        let server = Server::builder()
            .catalog(catalog)
            .config(config)
            .default_handler(Arc::new(Hello))
            .bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.launch());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /unmatched HTTP/1.1\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut resp = Vec::new();
        stream.read_to_end(&mut resp).await.unwrap();
        let text = String::from_utf8_lossy(&resp);
        assert!(text.ends_with("api"));
    }
}
