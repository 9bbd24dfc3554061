//! The handler plugin contract and the name-keyed catalog that routes
//! requests to it.
use crate::config::Config;
use crate::http::{request::Request, response::Response};
use crate::logger::Logger;
use crate::ws::pool::WebSocketPool;
use crate::ws::session::WebSocketSession;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// What a request handler must implement.
///
/// `handle` is synchronous from the session's point of view:
/// concurrency comes from running many sessions, not from suspending
/// inside a handler. A handler that does blocking work must report
/// [`Handler::is_heavy`] so the dispatcher off-loads it to the worker
/// pool instead of running it on a reactor thread.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &Request) -> Response;

    /// Whether this handler must run on the worker pool rather than
    /// inline on the reactor. Defaults to light (`false`).
    fn is_heavy(&self) -> bool {
        false
    }

    /// One-shot initialization hook, run once before the instance is
    /// added to the catalog. Default: no-op.
    fn on_load(&self) {}

    /// Receives the host's logger. Default: no-op (handlers that
    /// don't need logging can ignore it).
    fn set_logger(&self, _logger: Arc<Logger>) {}

    /// Receives the host's WebSocket pool. Default: no-op.
    fn set_websockets(&self, _pool: Arc<WebSocketPool>) {}

    /// Whether an upgrade request routed to this handler should be
    /// handed off to a WebSocket session rather than dispatched as a
    /// normal HTTP request. Default: not a WebSocket route.
    fn is_websocket(&self) -> bool {
        false
    }

    /// Called once the HTTP session has completed the WebSocket
    /// handshake and handed the socket off. Implementations register
    /// the session's key and wire up `on_receive`/`on_close` here.
    /// Default: no-op.
    fn on_websocket(&self, _session: Arc<WebSocketSession>) {}
}

/// Extracts the route key the catalog is looked up by: the URI
/// segment between the leading `/` and the next `/` (exclusive), or
/// the whole remainder if there is no second `/`. A bare `/` or empty
/// URI maps to the empty route.
pub fn main_route(uri: &str) -> &str {
    if uri.len() <= 1 {
        return "";
    }
    let rest = &uri[1..];
    match rest.find('/') {
        Some(idx) => &rest[..idx],
        None => rest,
    }
}

/// Name -> handler registry, hot-swappable without disturbing
/// in-flight requests: a lookup takes a snapshot `Arc`, so a `reload`
/// that installs a new map never invalidates a handler a request has
/// already bound to.
pub struct HandlerCatalog {
    inner: ArcSwap<HashMap<String, Arc<dyn Handler>>>,
}

impl Default for HandlerCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    pub fn from_map(map: HashMap<String, Arc<dyn Handler>>) -> Self {
        Self {
            inner: ArcSwap::from_pointee(map),
        }
    }

    /// Registers `handler` under `name`, running its `on_load` hook
    /// first. Read-modify-write: fine for startup registration and
    /// the infrequent `reload` command, not meant for a hot loop.
    pub fn insert(&self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        handler.on_load();
        let name = name.into();
        let mut map = (**self.inner.load()).clone();
        map.insert(name, handler);
        self.inner.store(Arc::new(map));
    }

    /// Looks up the handler bound to `route`. The returned `Arc` is a
    /// snapshot: it stays valid even if a concurrent `reload` swaps
    /// the catalog out from under this call.
    pub fn get(&self, route: &str) -> Option<Arc<dyn Handler>> {
        self.inner.load().get(route).cloned()
    }

    /// Atomically replaces the whole catalog, as `reload` does.
    pub fn swap(&self, map: HashMap<String, Arc<dyn Handler>>) {
        self.inner.store(Arc::new(map));
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Picks the handler that stands in for an unmatched route, per
/// `config`: the built-in handler when `default_request_handler` is
/// set, otherwise the catalog entry named by `custom_default_handler`.
/// Falls back to `builtin` (with a warning) if that name isn't
/// registered, so an unmatched route never goes without a handler.
pub fn resolve_default_handler(
    config: &Config,
    catalog: &HandlerCatalog,
    builtin: Arc<dyn Handler>,
    logger: &Logger,
) -> Arc<dyn Handler> {
    if config.default_request_handler {
        return builtin;
    }
    match catalog.get(&config.custom_default_handler) {
        Some(handler) => handler,
        None => {
            logger.warning(format!(
                "custom default handler '{}' not found in the catalog; falling back to the built-in handler",
                config.custom_default_handler
            ));
            builtin
        }
    }
}
