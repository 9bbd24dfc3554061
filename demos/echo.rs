use corehttp::{Handler, HandlerCatalog, Request, Response, Server};
use std::sync::Arc;

struct EchoHandler;

impl Handler for EchoHandler {
    fn handle(&self, req: &Request) -> Response {
        let result = format!(
            r#"{{"url": {:?}, "body": {:?}}}"#,
            req.uri, req.body,
        );

        Response::new()
            .status(200)
            .header("Content-Type", "application/json")
            .body(result)
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    Server::builder()
        .catalog(Arc::new(HandlerCatalog::new()))
        .default_handler(Arc::new(EchoHandler))
        .bind("127.0.0.1:8080")
        .await?
        .launch()
        .await;
    Ok(())
}
