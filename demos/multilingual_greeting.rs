use corehttp::{Handler, HandlerCatalog, Request, Response, Server};
use std::sync::Arc;

struct NotFound;
impl Handler for NotFound {
    fn handle(&self, _req: &Request) -> Response {
        Response::new()
            .status(404)
            .body("not found")
    }
}

struct Greeting;

impl Handler for Greeting {
    fn handle(&self, req: &Request) -> Response {
        let text = match req.uri.trim_start_matches("/api/") {
            "en" => r#"{"lang": "en", "text": "Hello, world!"}"#,
            "zh" => r#"{"lang": "zh", "text": "你好世界！"}"#,
            "es" => r#"{"lang": "es", "text": "¡Hola Mundo!"}"#,
            "ar" => r#"{"lang": "ar", "text": "مرحبا بالعالم!"}"#,
            "pt" => r#"{"lang": "pt", "text": "Olá, mundo!"}"#,
            "hi" => r#"{"lang": "hi", "text": "हैलो वर्ल्ड!"}"#,
            "ru" => r#"{"lang": "ru", "text": "Привет, мир!"}"#,
            _ => {
                return Response::new()
                    .status(404)
                    .header("Content-Type", "application/json")
                    .body(r#"{"error": "Language not supported", "status": "Not Found"}"#)
            }
        };

        Response::new()
            .status(200)
            .header("Content-Type", "application/json")
            .body(text)
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let catalog = HandlerCatalog::new();
    catalog.insert("api", Arc::new(Greeting));

    Server::builder()
        .catalog(Arc::new(catalog))
        .default_handler(Arc::new(NotFound))
        .bind("127.0.0.1:8080")
        .await?
        .launch()
        .await;
    Ok(())
}
