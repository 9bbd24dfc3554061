//! Per-connection HTTP session: read until headers, parse, dispatch
//! (inline or on the worker pool), write, and loop for keep-alive.
//!
//! A single task owns the whole state machine for its socket, which
//! is what gives the session its read/write mutual exclusion (H1):
//! there is no detached callback that could run a second read or
//! write concurrently with this one.
use crate::errors::ServerError;
use crate::handlers::catalog::{main_route, Handler, HandlerCatalog};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::logger::Logger;
use crate::server::worker_pool::WorkerPool;
use crate::ws::pool::WebSocketPool;
use crate::ws::session::WebSocketSession;
use arc_swap::ArcSwap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const READ_WRITE_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared, per-server state a connection needs to dispatch a request.
/// Cloned (cheaply, via `Arc`s) into every spawned connection task.
#[derive(Clone)]
pub(crate) struct ConnectionContext {
    pub(crate) catalog: Arc<HandlerCatalog>,
    /// Swappable so the `reload` command can rebind it (spec §4.10)
    /// without disturbing connections already dispatching through it.
    pub(crate) default_handler: Arc<ArcSwap<dyn Handler>>,
    pub(crate) workers: Arc<WorkerPool>,
    pub(crate) logger: Arc<Logger>,
    pub(crate) ws_pool: Arc<WebSocketPool>,
}

/// Runs one connection to completion: read/dispatch/write, looping on
/// keep-alive, until the peer closes, a deadline fires, or the route
/// upgrades to a WebSocket.
pub(crate) async fn run(mut stream: TcpStream, ctx: ConnectionContext) {
    let mut buf: Vec<u8> = Vec::with_capacity(4096);

    loop {
        buf.clear();
        let request = match read_request(&mut stream, &mut buf).await {
            Ok(request) => request,
            Err(ServerError::Timeout) => return,
            Err(err) => {
                let _ = write_response(&mut stream, &err.as_response()).await;
                return;
            }
        };

        if request.wants_websocket_upgrade() {
            let route = main_route(&request.uri).to_string();
            if let Some(handler) = ctx.catalog.get(&route) {
                if handler.is_websocket() {
                    handoff_to_websocket(stream, &ctx, handler).await;
                    return;
                }
            }
        }

        let response = dispatch(&ctx, request).await;
        let keep_alive = response.header_value("Connection") != Some("close");

        if write_response(&mut stream, &response).await.is_err() {
            return;
        }
        if !keep_alive {
            return;
        }
    }
}

/// Reads until the `\r\n\r\n` header terminator (scanned with
/// `memchr`), then tops up the body if `Content-Length` promises more
/// than was captured in the same read, bounded by `MAX_BODY_BYTES`.
async fn read_request(stream: &mut TcpStream, buf: &mut Vec<u8>) -> Result<Request, ServerError> {
    while memchr::memmem::find(buf, b"\r\n\r\n").is_none() {
        read_some(stream, buf).await?;
    }

    let mut request = Request::parse(buf);

    if let Some(wanted) = request.content_length() {
        if wanted > MAX_BODY_BYTES {
            return Err(ServerError::Parse("body too large"));
        }
        while request.body.len() < wanted {
            if read_some(stream, buf).await? == 0 {
                break;
            }
            request = Request::parse(buf);
        }
    }

    Ok(request)
}

/// Reads one chunk under the read deadline; `Ok(0)` means the peer
/// closed its write half.
async fn read_some(stream: &mut TcpStream, buf: &mut Vec<u8>) -> Result<usize, ServerError> {
    let mut chunk = [0u8; 4096];
    let n = timeout(READ_WRITE_TIMEOUT, stream.read(&mut chunk))
        .await
        .map_err(|_| ServerError::Timeout)?
        .map_err(ServerError::from)?;
    if n == 0 {
        return Err(ServerError::Timeout);
    }
    buf.extend_from_slice(&chunk[..n]);
    Ok(n)
}

async fn write_response(stream: &mut TcpStream, response: &Response) -> std::io::Result<()> {
    let bytes = response.to_bytes();
    timeout(READ_WRITE_TIMEOUT, stream.write_all(&bytes))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "write timed out"))??;
    Ok(())
}

/// Routes by [`main_route`], falling back to the configured default
/// handler. Heavy handlers run on the worker pool behind a oneshot
/// reply so the reactor task is never blocked by handler runtime.
/// Either way, a handler panic is caught and converted to `400`
/// rather than unwinding the connection task.
async fn dispatch(ctx: &ConnectionContext, request: Request) -> Response {
    let route = main_route(&request.uri).to_string();
    let handler = ctx
        .catalog
        .get(&route)
        .unwrap_or_else(|| ctx.default_handler.load_full());

    if handler.is_heavy() {
        let worker_handler = handler.clone();
        let rx = ctx.workers.submit_for(move || worker_handler.handle(&request));
        match rx.await {
            Ok(Ok(response)) => response,
            _ => ServerError::Handler.as_response(),
        }
    } else {
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&request))) {
            Ok(response) => response,
            Err(_) => ServerError::Handler.as_response(),
        }
    }
}

async fn handoff_to_websocket(stream: TcpStream, ctx: &ConnectionContext, handler: Arc<dyn Handler>) {
    match WebSocketSession::upgrade(
        stream,
        ctx.ws_pool.clone(),
        ctx.workers.clone(),
        ctx.logger.clone(),
    )
    .await
    {
        Ok(session) => handler.on_websocket(session),
        Err(err) => ctx.logger.warning(format!("websocket upgrade failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::catalog::HandlerCatalog;
    use std::collections::HashMap;

    struct Echo;
    impl Handler for Echo {
        fn handle(&self, req: &Request) -> Response {
            Response::new().status(200).body(req.uri.clone())
        }
    }

    struct Heavy;
    impl Handler for Heavy {
        fn handle(&self, _req: &Request) -> Response {
            Response::new().status(200).body("heavy")
        }
        fn is_heavy(&self) -> bool {
            true
        }
    }

    struct Panics;
    impl Handler for Panics {
        fn handle(&self, _req: &Request) -> Response {
            panic!("boom")
        }
    }

    fn ctx(default: Arc<dyn Handler>) -> ConnectionContext {
        ConnectionContext {
            catalog: Arc::new(HandlerCatalog::from_map(HashMap::new())),
            default_handler: Arc::new(ArcSwap::new(default)),
            workers: Arc::new(WorkerPool::new(2)),
            logger: Arc::new(Logger::new()),
            ws_pool: Arc::new(WebSocketPool::new()),
        }
    }

    #[tokio::test]
    async fn dispatch_runs_the_default_handler_when_no_route_matches() {
        let ctx = ctx(Arc::new(Echo));
        let req = Request {
            uri: "/anything".into(),
            ..Default::default()
        };
        let resp = dispatch(&ctx, req).await;
        assert_eq!(resp.body_bytes(), b"/anything");
    }

    #[tokio::test]
    async fn rebinding_the_default_handler_takes_effect_on_the_next_dispatch() {
        let ctx = ctx(Arc::new(Echo));
        ctx.default_handler.store(Arc::new(Heavy));
        let resp = dispatch(&ctx, Request::default()).await;
        assert_eq!(resp.body_bytes(), b"heavy");
    }

    #[tokio::test]
    async fn a_panicking_light_handler_yields_400_not_an_unwind() {
        let ctx = ctx(Arc::new(Panics));
        let resp = dispatch(&ctx, Request::default()).await;
        assert_eq!(resp.status_code(), 400);
    }

    #[tokio::test]
    async fn heavy_handlers_run_through_the_worker_pool() {
        let ctx = ctx(Arc::new(Heavy));
        let req = Request::default();
        let resp = dispatch(&ctx, req).await;
        assert_eq!(resp.body_bytes(), b"heavy");
    }
}
