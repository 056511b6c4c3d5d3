//! slircbot - Straylight IRC Bot
//!
//! Usage: `slircbot [config.toml]`

use slircbot::storage::Storage;
use slircbot::{Bot, Config};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    let storage = Storage::open(&config.bot.data_path).map_err(|e| {
        error!(path = %config.bot.data_path.display(), error = %e, "Failed to open storage");
        e
    })?;

    info!(
        servers = config.servers.len(),
        data = %config.bot.data_path.display(),
        "Starting slircbot"
    );

    let bot = Bot::new(config, storage, slircbot::modules::builtin());

    let signal_bot = bot.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down");
            signal_bot.quit();
        }
    });

    bot.run().await
}
