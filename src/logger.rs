//! A thread-safe logger with `log`/`warning`/`error` levels and an
//! optional command-line redraw, matching the console affordance
//! expected by [`crate::command::CommandExecutor`].
//!
//! Not a wrapper around `log`/`tracing`: the format (timestamp, thread
//! id, ANSI color) is part of the console contract, not a pluggable
//! backend.
use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_WARNING: &str = "\x1b[33m";
const COLOR_ERROR: &str = "\x1b[31m";

struct State {
    /// Current command-line buffer, redrawn under every log line when
    /// `redraw` is enabled.
    command_line: String,
    redraw: bool,
}

/// Mutex-guarded structured logger.
///
/// ```
/// use corehttp::Logger;
/// let logger = Logger::new();
/// logger.log("starting up");
/// logger.warning("disk space low");
/// logger.error("failed to bind port");
/// ```
pub struct Logger {
    state: Mutex<State>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                command_line: String::new(),
                redraw: false,
            }),
        }
    }

    /// Enables the `> <command buffer>` redraw after each log line.
    pub fn enable_command_line(&self) {
        self.state.lock().unwrap().redraw = true;
    }

    /// Updates the buffer redrawn by [`Logger::enable_command_line`].
    pub fn set_command_line(&self, buffer: impl Into<String>) {
        self.state.lock().unwrap().command_line = buffer.into();
    }

    pub fn log(&self, message: impl fmt::Display) {
        self.emit(None, message);
    }

    pub fn warning(&self, message: impl fmt::Display) {
        self.emit(Some(COLOR_WARNING), message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Some(COLOR_ERROR), message);
    }

    fn emit(&self, color: Option<&str>, message: impl fmt::Display) {
        let state = self.state.lock().unwrap();
        let ts = timestamp();
        let tid = std::thread::current().id();

        match color {
            Some(color) => println!("[{ts}][T{tid:?}] {color}{message}{COLOR_RESET}"),
            None => println!("[{ts}][T{tid:?}] {message}"),
        }

        if state.redraw {
            print!("> {}", state.command_line);
            use std::io::Write;
            let _ = std::io::stdout().flush();
        }
    }
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
