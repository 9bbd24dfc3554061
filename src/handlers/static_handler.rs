//! The built-in static-file handler: html-routing prefix walk, a
//! canonicalized-path jail against the public root, directory-index
//! resolution, MIME lookup, and LRU-backed caching.
use crate::cache::lru::LruCache;
use crate::errors::ServerError;
use crate::handlers::catalog::Handler;
use crate::http::request::Request;
use crate::http::response::Response;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>404 Not Found</title>
<style>
body { font-family: sans-serif; text-align: center; padding-top: 10%; background: #1a1a2e; color: #eee; }
h1 { font-size: 3rem; margin-bottom: 0; }
p { color: #aaa; }
</style>
</head>
<body>
<h1>404</h1>
<p>Oops! Page Not Found</p>
</body>
</html>
"#;

/// Serves files from a jailed root directory.
///
/// ```no_run
/// use corehttp::StaticHandler;
/// use std::sync::Arc;
///
/// let handler = StaticHandler::new("./public", true, None).unwrap();
/// let _ = Arc::new(handler);
/// ```
pub struct StaticHandler {
    root: PathBuf,
    html_routing: bool,
    cache: Option<Arc<LruCache<String, Vec<u8>>>>,
}

impl StaticHandler {
    pub fn new(
        root: impl AsRef<Path>,
        html_routing: bool,
        cache: Option<Arc<LruCache<String, Vec<u8>>>>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            root: fs::canonicalize(root)?,
            html_routing,
            cache,
        })
    }

    fn html_routed_uri(&self, uri: &str) -> String {
        if !self.html_routing || uri == "/" {
            return uri.to_string();
        }

        let mut search = String::new();
        for (idx, ch) in uri.char_indices() {
            if ch == '/' && idx > 0 {
                let candidate = self.root.join(format!("{}.html", &uri[1..idx]));
                if candidate.is_file() {
                    search = format!("{}.html", &uri[1..idx]);
                }
            }
        }
        if !search.is_empty() {
            return format!("/{search}");
        }
        uri.to_string()
    }

    fn resolve(&self, uri: &str) -> Result<PathBuf, ServerError> {
        let uri = if uri.is_empty() || uri == "/" {
            "/index.html".to_string()
        } else {
            self.html_routed_uri(uri)
        };

        let relative = uri.trim_start_matches('/');
        let candidate = self.root.join(relative);

        let canonical = fs::canonicalize(&candidate).map_err(|_| ServerError::FsNotFound)?;
        if !canonical.starts_with(&self.root) {
            return Err(ServerError::FsForbidden);
        }

        let canonical = if canonical.is_dir() {
            canonical.join("index.html")
        } else {
            canonical
        };

        if !canonical.is_file() {
            return Err(ServerError::FsNotFound);
        }
        Ok(canonical)
    }

    fn serve_file(&self, path: &Path) -> Result<Response, ServerError> {
        let key = path.to_string_lossy().to_string();

        if let Some(cache) = &self.cache {
            if let Some(bytes) = cache.get(&key) {
                return Ok(self.response_for(path, bytes));
            }
        }

        let bytes = fs::read(path).map_err(|err| ServerError::FsOther(crate::errors::IoError(err)))?;
        if let Some(cache) = &self.cache {
            let _ = cache.put(key, bytes.clone());
        }
        Ok(self.response_for(path, bytes))
    }

    fn response_for(&self, path: &Path, bytes: Vec<u8>) -> Response {
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        Response::new()
            .status(200)
            .header("Content-Type", mime)
            .body(bytes)
    }
}

impl Handler for StaticHandler {
    fn handle(&self, req: &Request) -> Response {
        if !matches!(req.method, crate::http::types::Method::Get) {
            return Response::new()
                .status(405)
                .header("Allow", "GET")
                .body("Method Not Allowed");
        }

        let result = self.resolve(&req.uri).and_then(|path| self.serve_file(&path));
        match result {
            Ok(response) => response,
            Err(err) => err.as_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct ScratchDir(PathBuf);

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    impl ScratchDir {
        fn path(&self) -> &Path {
            &self.0
        }
    }

    fn scratch_root() -> ScratchDir {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "corehttp-static-test-{}-{n}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        ScratchDir(dir)
    }

    fn write_file(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn get(uri: &str) -> Request {
        Request {
            uri: uri.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn serves_index_for_root_uri() {
        let dir = scratch_root();
        write_file(dir.path(), "index.html", "home");
        let handler = StaticHandler::new(dir.path(), false, None).unwrap();
        let resp = handler.handle(&get("/"));
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.body_bytes(), b"home");
    }

    #[test]
    fn escaping_the_root_is_forbidden() {
        let dir = scratch_root();
        write_file(dir.path(), "index.html", "home");
        let handler = StaticHandler::new(dir.path(), false, None).unwrap();
        let resp = handler.handle(&get("/../../etc/passwd"));
        assert_eq!(resp.status_code(), 403);
    }

    #[test]
    fn missing_file_is_404_with_the_built_in_page() {
        let dir = scratch_root();
        write_file(dir.path(), "index.html", "home");
        let handler = StaticHandler::new(dir.path(), false, None).unwrap();
        let resp = handler.handle(&get("/nope.html"));
        assert_eq!(resp.status_code(), 404);
        assert_eq!(resp.body_bytes(), NOT_FOUND_PAGE.as_bytes());
    }

    #[test]
    fn non_get_method_is_405_with_allow_header() {
        let dir = scratch_root();
        write_file(dir.path(), "index.html", "home");
        let handler = StaticHandler::new(dir.path(), false, None).unwrap();
        let mut req = get("/index.html");
        req.method = crate::http::types::Method::Post;
        let resp = handler.handle(&req);
        assert_eq!(resp.status_code(), 405);
        assert_eq!(resp.header_value("Allow"), Some("GET"));
        assert_eq!(resp.body_bytes(), b"Method Not Allowed");
    }

    #[test]
    fn html_routing_resolves_bare_prefix_to_html_file() {
        let dir = scratch_root();
        write_file(dir.path(), "index.html", "home");
        write_file(dir.path(), "about.html", "about page");
        let handler = StaticHandler::new(dir.path(), true, None).unwrap();
        let resp = handler.handle(&get("/about/team"));
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.body_bytes(), b"about page");
    }

    #[test]
    fn cache_hit_serves_without_rereading_the_file() {
        let dir = scratch_root();
        write_file(dir.path(), "index.html", "home");
        let cache = Arc::new(LruCache::new(1024, |v: &Vec<u8>| v.len()));
        let handler = StaticHandler::new(dir.path(), false, Some(cache.clone())).unwrap();

        let first = handler.handle(&get("/index.html"));
        assert_eq!(first.body_bytes(), b"home");
        assert_eq!(cache.len(), 1);

        let second = handler.handle(&get("/index.html"));
        assert_eq!(second.body_bytes(), b"home");
    }
}
