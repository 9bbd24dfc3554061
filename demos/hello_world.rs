use corehttp::{Handler, HandlerCatalog, Request, Response, Server};
use std::sync::Arc;

struct HelloWorld;

impl Handler for HelloWorld {
    fn handle(&self, _req: &Request) -> Response {
        Response::new()
            .status(200)
            .header("Content-Type", "text/plain")
            .body("Hello, world!")
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    Server::builder()
        .catalog(Arc::new(HandlerCatalog::new()))
        .default_handler(Arc::new(HelloWorld))
        .bind("127.0.0.1:8080")
        .await?
        .launch()
        .await;
    Ok(())
}
