//! Built-in modules.

mod core;
mod essentials;

pub use self::core::Core;
pub use self::essentials::Essentials;

use crate::module::{Module, ModuleFactory};

/// Factories for every built-in module, in load order.
pub fn builtin() -> Vec<ModuleFactory> {
    let factories: [ModuleFactory; 2] = [
        || Box::new(Core) as Box<dyn Module>,
        || Box::new(Essentials) as Box<dyn Module>,
    ];
    factories.to_vec()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use crate::bot::Bot;
    use crate::commands::dispatch;
    use crate::config::Config;
    use crate::network::Server;
    use crate::state::Sender;
    use crate::storage::Storage;

    pub(crate) const ADMIN_HOST: &str = "admin.example.org";

    /// A bot with the built-in modules loaded and one unconnected server
    /// whose output is captured.
    pub(crate) struct Harness {
        pub bot: Arc<Bot>,
        pub server: Arc<Server>,
        rx: Mutex<mpsc::UnboundedReceiver<String>>,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        pub(crate) fn new() -> Self {
            let config: Config = r#"
[servers.test]
server = "127.0.0.1"
port = 6667
prefix = "%"

[servers.test.privileges]
"admin.example.org" = "ADMIN"
"#
            .parse()
            .unwrap();
            let dir = tempfile::tempdir().unwrap();
            let storage = Storage::open(dir.path().join("data.json")).unwrap();
            let bot = Bot::new(config, storage, super::builtin());
            bot.load_modules();
            let server = bot.server("test").unwrap();
            let rx = Mutex::new(server.capture_outbound());
            Self {
                bot,
                server,
                rx,
                _dir: dir,
            }
        }

        /// Dispatch `text` from `alice!al@<host>` and collect what was sent.
        pub(crate) async fn run(&self, host: &str, receiver: &str, text: &str) -> Vec<String> {
            let sender = Sender {
                nick: "alice".into(),
                ident: Some("al".into()),
                host: Some(host.into()),
                access: self.server.privileges().resolve(Some(host)),
            };
            let task = dispatch::invoke(
                &self.bot.registry(),
                Arc::downgrade(&self.bot),
                &self.server,
                &sender,
                receiver,
                text,
            );
            if let Some(task) = task {
                task.await.unwrap();
            }
            let mut rx = self.rx.lock();
            let mut lines = Vec::new();
            while let Ok(line) = rx.try_recv() {
                lines.push(line);
            }
            lines
        }
    }
}
