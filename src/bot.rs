//! The bot: servers, modules and the shared command snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, warn};

use crate::commands::{CommandRegistry, Dispatcher, Namespace};
use crate::config::Config;
use crate::events::EventMask;
use crate::module::{LoadedModule, ModuleContext, ModuleFactory};
use crate::network::Server;
use crate::storage::Storage;

/// How long shutdown waits for connections to say goodbye.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct Bot {
    config: Config,
    /// Active connections; a server is removed once its task ends.
    servers: DashMap<String, Arc<Server>>,
    registry: RwLock<Arc<CommandRegistry>>,
    modules: Mutex<Vec<LoadedModule>>,
    /// Serializes load, reload and unload.
    reload_lock: Mutex<()>,
    factories: Vec<ModuleFactory>,
    storage: Arc<Storage>,
    shutdown: CancellationToken,
    me: Weak<Bot>,
}

impl Bot {
    /// Build the bot and one [`Server`] per configured connection. Nothing
    /// connects until [`run`](Self::run).
    pub fn new(config: Config, storage: Arc<Storage>, factories: Vec<ModuleFactory>) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Bot>| {
            let servers = DashMap::new();
            for (name, server_config) in &config.servers {
                let server = Server::new(name.as_str(), server_config.clone());
                server.add_callback(EventMask::PRIVMSG, Arc::new(Dispatcher::new(me.clone())));
                servers.insert(name.clone(), server);
            }
            Self {
                config,
                servers,
                registry: RwLock::new(Arc::new(CommandRegistry::default())),
                modules: Mutex::new(Vec::new()),
                reload_lock: Mutex::new(()),
                factories,
                storage,
                shutdown: CancellationToken::new(),
                me: me.clone(),
            }
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Current command snapshot.
    pub fn registry(&self) -> Arc<CommandRegistry> {
        Arc::clone(&self.registry.read())
    }

    pub fn server(&self, name: &str) -> Option<Arc<Server>> {
        self.servers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn servers(&self) -> Vec<Arc<Server>> {
        self.servers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Names of the loaded modules, in load order.
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.lock().iter().map(LoadedModule::name).collect()
    }

    // ---------------------------------------------------------------------
    // Modules
    // ---------------------------------------------------------------------

    /// Construct fresh modules, swap in their commands, then unload the
    /// previous set. A module that fails to initialize is skipped.
    ///
    /// Commands keep resolving against the previous tree until the swap.
    /// Returns how many modules loaded.
    pub fn load_modules(&self) -> usize {
        let _reload = self.reload_lock.lock();

        let mut root = Namespace::new();
        let mut loaded = Vec::new();
        for factory in &self.factories {
            let mut module = factory();
            let name = module.name();
            let enabled = match &self.config.bot.modules {
                Some(wanted) => wanted.iter().any(|w| w == name),
                None => true,
            };
            if !enabled {
                info!(module = name, "Module disabled by configuration");
                continue;
            }

            info!(module = name, "Loading module");
            let ctx = Arc::new(ModuleContext::new(
                name,
                self.storage.module(name),
                self.config.module_table(name),
                self.me.clone(),
            ));
            let init = {
                let _enter = ctx.span().clone().entered();
                module.init(&ctx)
            };
            if let Err(e) = init {
                error!(module = name, error = %format!("{e:#}"), "Module failed to initialize");
                ctx.abort_tasks();
                continue;
            }
            module.register(&mut root);
            loaded.push(LoadedModule { module, ctx });
        }

        if let Some(wanted) = &self.config.bot.modules {
            for name in wanted {
                if !loaded.iter().any(|m: &LoadedModule| m.name() == name) {
                    warn!(module = %name, "Configured module was not loaded");
                }
            }
        }

        let count = loaded.len();
        let registry = Arc::new(CommandRegistry::new(root));
        info!(modules = count, commands = registry.len(), "Modules loaded");
        let previous = self.swap_modules(loaded, registry);
        unload_all(previous);
        count
    }

    /// Unload every module and clear the command tree. In-flight commands
    /// finish on the snapshot they started with.
    pub fn unload_modules(&self) {
        let _reload = self.reload_lock.lock();
        let previous = self.swap_modules(Vec::new(), Arc::new(CommandRegistry::default()));
        unload_all(previous);
    }

    /// Publish a module set and its commands together.
    fn swap_modules(
        &self,
        modules: Vec<LoadedModule>,
        registry: Arc<CommandRegistry>,
    ) -> Vec<LoadedModule> {
        let mut current = self.modules.lock();
        *self.registry.write() = registry;
        std::mem::replace(&mut *current, modules)
    }

    pub fn reload(&self) -> usize {
        self.load_modules()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Quit every server and stop the bot.
    pub fn quit(&self) {
        info!("Quitting all servers");
        for server in self.servers() {
            server.quit();
        }
        self.shutdown.cancel();
    }

    /// Load modules, run every connection concurrently and return once all
    /// of them have ended or [`quit`](Self::quit) was called.
    ///
    /// Fails only when every connection failed permanently.
    pub async fn run(self: &Arc<Self>) -> anyhow::Result<()> {
        self.load_modules();

        let mut tasks = JoinSet::new();
        let mut names = HashMap::new();
        for server in self.servers() {
            let name = server.name().to_string();
            let span = tracing::info_span!("server", name = %name);
            let handle = tasks.spawn(server.run().instrument(span));
            names.insert(handle.id(), name);
        }
        let total = names.len();
        let mut failed = 0;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                joined = tasks.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    let (id, outcome) = match joined {
                        Ok((id, result)) => (id, result.map_err(anyhow::Error::from)),
                        Err(e) => (e.id(), Err(anyhow::anyhow!("connection task failed: {e}"))),
                    };
                    let name = names.remove(&id).unwrap_or_default();
                    self.servers.remove(&name);
                    match outcome {
                        Ok(()) => info!(server = %name, "Connection finished, removed from server list"),
                        Err(e) => {
                            failed += 1;
                            error!(server = %name, error = %e, "Connection failed permanently");
                        }
                    }
                }
            }
        }

        if !tasks.is_empty() {
            let drained = time::timeout(SHUTDOWN_GRACE, async {
                while tasks.join_next().await.is_some() {}
            })
            .await;
            if drained.is_err() {
                warn!(remaining = tasks.len(), "Connections did not close in time, aborting");
                tasks.shutdown().await;
            }
        }
        self.servers.clear();
        self.unload_modules();

        if total > 0 && failed == total {
            anyhow::bail!("every server connection failed permanently");
        }
        info!("Bot stopped");
        Ok(())
    }
}

fn unload_all(modules: Vec<LoadedModule>) {
    for module in modules {
        info!(module = module.name(), "Unloading module");
        module.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::task::AbortHandle;

    use crate::commands::{Arguments, CommandEntry, Responder};
    use crate::module::Module;

    /// Every task ever spawned by a `Ticker`.
    static TICKER_TASKS: Mutex<Vec<AbortHandle>> = parking_lot::const_mutex(Vec::new());

    struct Ticker;

    impl Module for Ticker {
        fn name(&self) -> &'static str {
            "ticker"
        }

        fn init(&mut self, ctx: &Arc<ModuleContext>) -> anyhow::Result<()> {
            let task = ctx.spawn(std::future::pending::<()>());
            TICKER_TASKS.lock().push(task.abort_handle());
            Ok(())
        }

        fn register(&self, root: &mut Namespace) {
            root.insert(CommandEntry::from_fn("tick", |_r: Responder, _a: Arguments| async {
                Ok(())
            }));
        }
    }

    /// Same command as [`Ticker`], no background work.
    struct Plain;

    impl Module for Plain {
        fn name(&self) -> &'static str {
            "plain"
        }

        fn register(&self, root: &mut Namespace) {
            Ticker.register(root);
        }
    }

    fn bot_with(dir: &tempfile::TempDir, factory: ModuleFactory) -> Arc<Bot> {
        let config: Config = r#"
[servers.test]
server = "127.0.0.1"
port = 6667
prefix = "%"
"#
        .parse()
        .unwrap();
        let storage = Storage::open(dir.path().join("data.json")).unwrap();
        Bot::new(config, storage, vec![factory])
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_reloads_never_expose_empty_tree_or_leak_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let bot = bot_with(&dir, || Box::new(Ticker) as Box<dyn Module>);
        bot.load_modules();

        let stop = Arc::new(AtomicBool::new(false));
        let watcher = tokio::task::spawn_blocking({
            let bot = bot.clone();
            let stop = stop.clone();
            move || {
                let mut saw_empty = false;
                while !stop.load(Ordering::Relaxed) {
                    saw_empty |= bot.registry().resolve(&["tick".to_string()]).is_err();
                }
                saw_empty
            }
        });

        let reloads: Vec<_> = (0..8)
            .map(|_| {
                let bot = bot.clone();
                tokio::task::spawn_blocking(move || bot.reload())
            })
            .collect();
        for reload in reloads {
            assert_eq!(reload.await.unwrap(), 1);
        }
        stop.store(true, Ordering::Relaxed);
        assert!(!watcher.await.unwrap(), "command tree was empty during a reload");
        assert_eq!(bot.module_names(), vec!["ticker"]);

        bot.unload_modules();
        assert!(bot.registry().is_empty());
        tokio::time::timeout(Duration::from_secs(5), async {
            while TICKER_TASKS.lock().iter().any(|task| !task.is_finished()) {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("background tasks outlived their module");
        assert_eq!(TICKER_TASKS.lock().len(), 9);
    }

    #[tokio::test]
    async fn test_reload_swaps_modules_after_building_the_new_set() {
        let dir = tempfile::tempdir().unwrap();
        let bot = bot_with(&dir, || Box::new(Plain) as Box<dyn Module>);
        assert_eq!(bot.load_modules(), 1);
        let before = bot.registry();

        assert_eq!(bot.reload(), 1);
        let after = bot.registry();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.resolve(&["tick".to_string()]).is_ok());
        assert_eq!(bot.module_names(), vec!["plain"]);
    }
}
