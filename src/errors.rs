use crate::http::response::Response;
use std::{error, fmt, io};

/// The taxonomy of failures the core can encounter, and how each one is
/// turned into a response (or a silent close) at the session boundary.
///
/// Network errors never escape a connection task and filesystem errors
/// never escape the static handler; both are converted here.
#[derive(Debug)]
pub(crate) enum ServerError {
    /// Malformed request line or header.
    Parse(&'static str),
    /// A handler panicked while being dispatched.
    Handler,
    /// Static handler: path not found under the public root.
    FsNotFound,
    /// Static handler: canonical path escaped the public root.
    FsForbidden,
    /// Static handler: any other filesystem failure.
    FsOther(IoError),
    /// Read or write deadline elapsed.
    Timeout,
    /// A connection-level I/O error that isn't a timeout (e.g. a reset
    /// socket); the session closes rather than rendering a body.
    Io(IoError),
    /// `accept()` failed; the caller should log and keep accepting.
    Accept(IoError),
    /// LRU `put` of a value larger than the cache's byte ceiling.
    CacheOverflow,
}

impl ServerError {
    /// Renders the subset of variants that have a well-formed HTTP
    /// representation. `Timeout` and `Accept` have no response: the
    /// caller closes the socket (or keeps accepting) instead.
    pub(crate) fn as_response(&self) -> Response {
        let (status, body) = match self {
            Self::Parse(_) => (400, ""),
            Self::Handler => (400, ""),
            Self::FsNotFound => (404, super::handlers::static_handler::NOT_FOUND_PAGE),
            Self::FsForbidden => (403, "<h1>403 Forbidden</h1>"),
            Self::FsOther(_) => (500, "<h1>500 Internal Server Error</h1>"),
            Self::CacheOverflow => (500, ""),
            Self::Timeout | Self::Io(_) | Self::Accept(_) => (500, ""),
        };

        Response::new().status(status).body(body)
    }
}

impl error::Error for ServerError {}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(reason) => write!(f, "parse error: {reason}"),
            Self::Handler => write!(f, "handler panicked"),
            Self::FsNotFound => write!(f, "not found"),
            Self::FsForbidden => write!(f, "forbidden"),
            Self::FsOther(err) => write!(f, "filesystem error: {err}"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Accept(err) => write!(f, "accept failed: {err}"),
            Self::CacheOverflow => write!(f, "value exceeds cache capacity"),
        }
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        Self::Io(IoError(err))
    }
}

#[derive(Debug)]
pub(crate) struct IoError(pub(crate) io::Error);

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}
