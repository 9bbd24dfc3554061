use corehttp::{Handler, HandlerCatalog, Request, Response, Server};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Counts requests across the whole server rather than per connection:
// handlers are shared state (`Arc<dyn Handler>`), not bound one
// instance per socket.
struct Counter(AtomicUsize);

impl Handler for Counter {
    fn handle(&self, _req: &Request) -> Response {
        let count = self.0.fetch_add(1, Ordering::Relaxed) + 1;

        Response::new()
            .status(200)
            .header("Content-Type", "application/json")
            .body(format!(r#"{{"count_request": {count}}}"#))
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    Server::builder()
        .catalog(Arc::new(HandlerCatalog::new()))
        .default_handler(Arc::new(Counter(AtomicUsize::new(0))))
        .bind("127.0.0.1:8080")
        .await?
        .launch()
        .await;
    Ok(())
}
