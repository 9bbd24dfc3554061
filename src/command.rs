//! The interactive command console: a case-folded command registry
//! shared with the reactor, plus the built-in `exit`/`reload`
//! commands. The raw terminal input reader is out of scope here; any
//! `AsyncBufRead` of lines (a file, a test fixture, or real stdin via
//! [`CommandExecutor::run_stdin`]) drives the loop.
use crate::config::Config;
use crate::handlers::catalog::{resolve_default_handler, Handler, HandlerCatalog};
use crate::logger::Logger;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

type Action = Box<dyn Fn(&[String]) + Send + Sync>;

/// Registry of named, case-folded commands plus the loop that reads
/// and dispatches them.
pub struct CommandExecutor {
    logger: Arc<Logger>,
    commands: HashMap<String, Action>,
}

impl CommandExecutor {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            commands: HashMap::new(),
        }
    }

    /// Registers `name` (case-folded) to run `action` when typed.
    pub fn register(&mut self, name: impl AsRef<str>, action: impl Fn(&[String]) + Send + Sync + 'static) {
        self.commands
            .insert(name.as_ref().to_lowercase(), Box::new(action));
    }

    /// Runs one command line, logging a warning if it is unregistered.
    pub fn run_command(&self, line: &str) {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return;
        };
        let args: Vec<String> = tokens.map(str::to_string).collect();

        match self.commands.get(&name.to_lowercase()) {
            Some(action) => action(&args),
            None => self.logger.warning(format!("unknown command: {name}")),
        }
    }

    /// Drains `input` line by line, dispatching each to
    /// [`CommandExecutor::run_command`], until EOF or a registered
    /// command stops the loop by returning control to the caller
    /// (the built-in `exit` command signals its own shutdown token;
    /// this loop itself just keeps reading).
    pub async fn run_lines<R: AsyncBufRead + Unpin>(&self, input: R) {
        let mut lines = input.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            self.logger.set_command_line(String::new());
            self.run_command(&line);
        }
    }

    pub async fn run_stdin(&self) {
        self.run_lines(BufReader::new(tokio::io::stdin())).await;
    }

    /// Registers the built-in `exit` command: notifies every waiter
    /// on `shutdown` (pair it with [`Notify::notified`] in whatever
    /// is awaiting shutdown, e.g. as the future passed to
    /// [`crate::Server::launch_with_shutdown`]).
    pub fn register_exit(&mut self, shutdown: Arc<Notify>) {
        self.register("exit", move |_| shutdown.notify_waiters());
    }

    /// Registers the built-in `reload` command: calls `rebuild` to
    /// produce a fresh configuration and route map, atomically swaps
    /// the map into `catalog`, then rebinds `default_handler` by
    /// re-running [`resolve_default_handler`] against the freshly
    /// rebuilt catalog and `builtin`. Port and other bind-time
    /// settings are not affected; only a full restart changes those.
    pub fn register_reload(
        &mut self,
        catalog: Arc<HandlerCatalog>,
        default_handler: Arc<ArcSwap<dyn Handler>>,
        builtin: Arc<dyn Handler>,
        rebuild: impl Fn() -> (Config, HashMap<String, Arc<dyn Handler>>) + Send + Sync + 'static,
    ) {
        let logger = self.logger.clone();
        self.register("reload", move |_| {
            let (config, map) = rebuild();
            catalog.swap(map);
            let resolved = resolve_default_handler(&config, &catalog, builtin.clone(), &logger);
            default_handler.store(resolved);
            logger.log(
                "catalog reloaded; port and other bind-time settings require a full restart",
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn registered_command_runs_with_its_args() {
        let logger = Arc::new(Logger::new());
        let mut exe = CommandExecutor::new(logger);
        let seen: Arc<StdMutex<Vec<String>>> = Arc::new(StdMutex::new(Vec::new()));
        let seen2 = seen.clone();
        exe.register("greet", move |args| {
            seen2.lock().unwrap().extend(args.iter().cloned());
        });

        exe.run_lines("GREET world\n".as_bytes()).await;
        assert_eq!(*seen.lock().unwrap(), vec!["world".to_string()]);
    }

    #[tokio::test]
    async fn command_names_are_case_folded() {
        let logger = Arc::new(Logger::new());
        let mut exe = CommandExecutor::new(logger);
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        exe.register("exit", move |_| {
            count2.fetch_add(1, Ordering::SeqCst);
        });

        exe.run_lines("EXIT\n".as_bytes()).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_command_does_not_panic() {
        let logger = Arc::new(Logger::new());
        let exe = CommandExecutor::new(logger);
        exe.run_lines("frobnicate\n".as_bytes()).await;
    }

    struct Echo;
    impl Handler for Echo {
        fn handle(&self, req: &crate::Request) -> crate::Response {
            crate::Response::new().status(200).body(req.uri.clone())
        }
    }

    #[tokio::test]
    async fn exit_notifies_the_shutdown_token() {
        let logger = Arc::new(Logger::new());
        let mut exe = CommandExecutor::new(logger);
        let shutdown = Arc::new(Notify::new());
        exe.register_exit(shutdown.clone());

        let wait = shutdown.notified();
        exe.run_command("exit");
        wait.await;
    }

    #[tokio::test]
    async fn reload_swaps_the_catalog() {
        let logger = Arc::new(Logger::new());
        let mut exe = CommandExecutor::new(logger);
        let catalog = Arc::new(HandlerCatalog::new());
        let default_handler = Arc::new(ArcSwap::new(Arc::new(Echo) as Arc<dyn Handler>));
        exe.register_reload(catalog.clone(), default_handler, Arc::new(Echo), || {
            let mut map: HashMap<String, Arc<dyn Handler>> = HashMap::new();
            map.insert("api".to_string(), Arc::new(Echo));
            (Config::default(), map)
        });

        assert!(catalog.get("api").is_none());
        exe.run_command("reload");
        assert!(catalog.get("api").is_some());
    }

    struct Named(&'static str);
    impl Handler for Named {
        fn handle(&self, _req: &crate::Request) -> crate::Response {
            crate::Response::new().status(200).body(self.0)
        }
    }

    #[tokio::test]
    async fn reload_rebinds_the_default_handler_to_the_refreshed_catalog_entry() {
        let logger = Arc::new(Logger::new());
        let mut exe = CommandExecutor::new(logger);
        let catalog = Arc::new(HandlerCatalog::new());
        let builtin: Arc<dyn Handler> = Arc::new(Named("builtin"));
        let default_handler = Arc::new(ArcSwap::new(builtin.clone()));

        exe.register_reload(catalog.clone(), default_handler.clone(), builtin, || {
            let mut config = Config::default();
            config.default_request_handler = false;
            config.custom_default_handler = "custom".to_string();
            let mut map: HashMap<String, Arc<dyn Handler>> = HashMap::new();
            map.insert("custom".to_string(), Arc::new(Named("custom")));
            (config, map)
        });

        exe.run_command("reload");
        let resp = default_handler.load().handle(&crate::Request::default());
        assert_eq!(resp.body_bytes(), b"custom");
    }
}
