//! Integration test common infrastructure.
//!
//! Provides a scripted IRC server the bot connects to, and helpers to build
//! bot configurations pointing at it.

pub mod server;

#[allow(unused_imports)]
pub use server::{MockIrcd, Peer};

use std::sync::Arc;

use slircbot::storage::Storage;
use slircbot::{Bot, Config};

/// Hostname granted ADMIN in [`config_for`] configs.
#[allow(dead_code)]
pub const ADMIN_HOST: &str = "admin.example.org";

/// A single-server config named `mock` aimed at `port`, with `extra` keys
/// appended to the server table.
#[allow(dead_code)]
pub fn config_for(port: u16, extra: &str) -> Config {
    format!(
        r#"
[servers.mock]
server = "127.0.0.1"
port = {port}
username = "slircbot"
prefix = "%"
quit_msg = "bye"
{extra}

[servers.mock.privileges]
"{ADMIN_HOST}" = "ADMIN"
"#
    )
    .parse()
    .expect("test config should be valid")
}

/// A bot with the built-in modules and storage in `dir`.
#[allow(dead_code)]
pub fn bot_for(config: Config, dir: &tempfile::TempDir) -> Arc<Bot> {
    let storage = Storage::open(dir.path().join("data.json")).expect("storage");
    Bot::new(config, storage, slircbot::modules::builtin())
}
