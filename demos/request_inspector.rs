use corehttp::{Handler, HandlerCatalog, Request, Response, Server};
use std::sync::Arc;

struct Inspector;

impl Handler for Inspector {
    fn handle(&self, req: &Request) -> Response {
        let user_agent = if let Some(value) = req.header("User-Agent") {
            format!(r#", "user_agent": {value:?}"#)
        } else {
            String::new()
        };

        let content_type = if let Some(value) = req.header("Content-Type") {
            format!(r#", "content_type": {value:?}"#)
        } else {
            String::new()
        };

        let result = format!(
            r#"{{"method": "{:?}", "path": {:?}{user_agent}{content_type}, "body": {:?}}}"#,
            req.method, req.uri, req.body,
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
        .default_handler(Arc::new(Inspector))
        .bind("127.0.0.1:8080")
        .await?
        .launch()
        .await;
    Ok(())
}
