//! corehttp - an embeddable HTTP/1.1 application server.
//!
//! A connection-oriented HTTP/1.1 server with a pluggable request-handler
//! model, a WebSocket upgrade path, a bounded LRU cache handlers can reuse
//! for their own caching needs, and an interactive command console for
//! reload/shutdown.
//!
//! # Architecture
//!
//! - **Reactor**: the Tokio multi-thread runtime's own worker threads run
//!   every connection's read/dispatch/write loop.
//! - **Worker pool**: a fixed set of dedicated threads (default 4) runs
//!   handlers flagged `is_heavy`, so a slow handler never stalls accepts
//!   or other connections. See [`server::worker_pool`].
//! - **Handler catalog**: routes the first URI path segment to a
//!   registered [`Handler`], hot-swappable via [`HandlerCatalog::swap`]
//!   without disturbing in-flight requests.
//!
//! # Quick start
//!
//! ```no_run
//! use corehttp::{Server, Handler, HandlerCatalog, Request, Response};
//! use std::sync::Arc;
//!
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn handle(&self, _req: &Request) -> Response {
//!         Response::new().status(200).body("Hello, world!")
//!     }
//! }
//!
//! struct ApiRoute;
//!
//! impl Handler for ApiRoute {
//!     fn handle(&self, _req: &Request) -> Response {
//!         Response::new().status(200).body(r#"{"ok":true}"#)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let catalog = HandlerCatalog::new();
//!     catalog.insert("api", Arc::new(ApiRoute));
//!
//!     Server::builder()
//!         .catalog(Arc::new(catalog))
//!         .default_handler(Arc::new(Hello))
//!         .bind("127.0.0.1:8080")
//!         .await?
//!         .launch()
//!         .await;
//!     Ok(())
//! }
//! ```
pub(crate) mod cache {
    pub mod lru;
}
pub(crate) mod http {
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
pub(crate) mod handlers {
    pub(crate) mod catalog;
    pub(crate) mod static_handler;
}
pub(crate) mod ws {
    pub(crate) mod pool;
    pub(crate) mod session;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
    pub(crate) mod worker_pool;
}
pub(crate) mod command;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod logger;

pub use crate::{
    cache::lru::LruCache,
    command::CommandExecutor,
    config::Config,
    errors::ServerError,
    handlers::{
        catalog::{main_route, resolve_default_handler, HandlerCatalog},
        static_handler::StaticHandler,
    },
    http::{
        request::Request,
        response::Response,
        types::{Method, StatusCode, Version},
    },
    logger::Logger,
    server::{
        server_impl::{ctrl_c_or_sigterm, Handler, Server, ServerBuilder},
        worker_pool::WorkerPool,
    },
    ws::{pool::WebSocketPool, session::WebSocketSession},
};

pub use arc_swap::ArcSwap;
