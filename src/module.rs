//! The module interface.
//!
//! A module is constructed by its factory on every (re)load, initialized
//! with a [`ModuleContext`], asked to register its commands, and unloaded
//! before the next load or at shutdown.

use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{Instrument, Span, debug};

use crate::bot::Bot;
use crate::commands::Namespace;
use crate::storage::ModuleStorage;

/// A unit of bot functionality.
pub trait Module: Send + Sync {
    /// Stable name: storage slot, config table and load filter key.
    fn name(&self) -> &'static str;

    /// Called once before [`register`](Self::register).
    fn init(&mut self, _ctx: &Arc<ModuleContext>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Add this module's commands to the root namespace.
    fn register(&self, root: &mut Namespace);

    /// Called before the module is dropped. Background tasks spawned through
    /// the context are aborted right after.
    fn unload(&mut self) {}
}

/// Builds a fresh module instance.
pub type ModuleFactory = fn() -> Box<dyn Module>;

/// What a module gets from the bot.
pub struct ModuleContext {
    name: String,
    storage: ModuleStorage,
    config: toml::Table,
    span: Span,
    tasks: Mutex<Vec<AbortHandle>>,
    bot: Weak<Bot>,
}

impl ModuleContext {
    pub fn new(name: &str, storage: ModuleStorage, config: toml::Table, bot: Weak<Bot>) -> Self {
        Self {
            name: name.to_string(),
            storage,
            config,
            span: tracing::info_span!("module", name = %name),
            tasks: Mutex::new(Vec::new()),
            bot,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> &ModuleStorage {
        &self.storage
    }

    /// The module's `[modules.<name>]` table.
    pub fn config(&self) -> &toml::Table {
        &self.config
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn bot(&self) -> Option<Arc<Bot>> {
        self.bot.upgrade()
    }

    /// Spawn a background task that lives until the module is unloaded.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = tokio::spawn(future.instrument(self.span.clone()));
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle.abort_handle());
        handle
    }

    /// Abort every task started with [`spawn`](Self::spawn).
    pub fn abort_tasks(&self) -> usize {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        let live = tasks.iter().filter(|task| !task.is_finished()).count();
        for task in tasks {
            task.abort();
        }
        if live > 0 {
            debug!(module = %self.name, tasks = live, "Aborted background tasks");
        }
        live
    }
}

/// A module instance together with its context.
pub struct LoadedModule {
    pub module: Box<dyn Module>,
    pub ctx: Arc<ModuleContext>,
}

impl LoadedModule {
    pub fn name(&self) -> &'static str {
        self.module.name()
    }

    pub fn unload(mut self) {
        let _enter = self.ctx.span.clone().entered();
        self.module.unload();
        self.ctx.abort_tasks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use std::time::Duration;

    #[tokio::test]
    async fn test_abort_tasks_on_unload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path().join("data.json")).unwrap();
        let ctx = ModuleContext::new("ticker", storage.module("ticker"), toml::Table::new(), Weak::new());

        let forever = ctx.spawn(async {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
        let done = ctx.spawn(async { 7 });
        assert_eq!(done.await.unwrap(), 7);

        assert_eq!(ctx.abort_tasks(), 1);
        assert!(forever.await.unwrap_err().is_cancelled());
        assert_eq!(ctx.abort_tasks(), 0);
    }
}
