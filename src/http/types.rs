//! Core HTTP protocol types.

/// HTTP request method.
///
/// # Disabled methods
///
/// `TRACE` and `CONNECT` are not modeled; the core has no use for
/// either.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Method {
    Get,
    Put,
    Post,
    Head,
    Patch,
    Delete,
    Options,
    /// Any method string not recognized above, carried as-is for
    /// diagnostics (e.g. to build a `405 Method Not Allowed`).
    #[default]
    Other,
}

impl Method {
    pub(crate) fn from_str(src: &str) -> Self {
        match src {
            "GET" => Self::Get,
            "PUT" => Self::Put,
            "POST" => Self::Post,
            "HEAD" => Self::Head,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Other => "",
        }
    }
}

/// HTTP protocol version carried on the request/status line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub(crate) fn from_str(src: &str) -> Option<Self> {
        match src {
            "HTTP/1.1" => Some(Self::Http11),
            "HTTP/1.0" => Some(Self::Http10),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http11 => "HTTP/1.1",
            Self::Http10 => "HTTP/1.0",
        }
    }
}

/// A numeric HTTP status code, with the default status-message table
/// used when a [`crate::Response`] doesn't set its own message.
pub type StatusCode = u16;

pub(crate) fn default_status_message(code: StatusCode) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
