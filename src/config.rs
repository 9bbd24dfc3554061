//! The configuration record the core consumes, plus a convenience
//! `.env`-style loader. Populating a [`Config`] is the embedding
//! application's job; `Server` never reads files to build its own.
use std::fs;
use std::path::Path;

/// Configuration consumed by [`crate::Server`] and the static handler.
///
/// `cache_size_kb` is kilobytes; the byte ceiling handed to the LRU
/// cache is `cache_size_kb * 1024`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub default_request_handler: bool,
    pub html_routing: bool,
    pub cache: bool,
    pub cache_size_kb: u64,
    pub custom_default_handler: String,
    pub debug_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            default_request_handler: true,
            html_routing: true,
            cache: true,
            cache_size_kb: 65356,
            custom_default_handler: "none".to_string(),
            debug_mode: false,
        }
    }
}

impl Config {
    /// Byte ceiling for the static-file cache.
    pub fn cache_max_bytes(&self) -> u64 {
        self.cache_size_kb * 1024
    }

    /// Loads a `KEY=VALUE` env file on top of [`Config::default`].
    /// Blank lines and lines starting with `#` are skipped. Missing
    /// keys keep their default value.
    ///
    /// ```no_run
    /// use corehttp::Config;
    /// let cfg = Config::from_env_file("./.env").unwrap();
    /// ```
    pub fn from_env_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_env_str(&text))
    }

    fn from_env_str(text: &str) -> Self {
        let mut cfg = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "SERVER_PORT" => {
                    if let Ok(port) = value.parse() {
                        cfg.port = port;
                    }
                }
                "DEFAULT_REQUEST_HANDLER" => cfg.default_request_handler = parse_bool(value),
                "HTML_ROUTING" => cfg.html_routing = parse_bool(value),
                "CACHE" => cfg.cache = parse_bool(value),
                "CACHE_SIZE_KB" => {
                    if let Ok(kb) = value.parse() {
                        cfg.cache_size_kb = kb;
                    }
                }
                "CUSTOM_DEFAULT_HANDLER" => cfg.custom_default_handler = value.to_string(),
                "DEBUG_MODE" => cfg.debug_mode = parse_bool(value),
                _ => {}
            }
        }
        cfg
    }
}

fn parse_bool(value: &str) -> bool {
    value == "true" || value == "1"
}
