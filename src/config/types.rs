//! Core configuration types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::defaults::*;
use super::validation::{self, ValidationError};
use crate::access::AccessLevel;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Process-wide settings.
    #[serde(default)]
    pub bot: BotConfig,
    /// Connections, keyed by connection name.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
    /// Free-form per-module tables, keyed by module name.
    #[serde(default)]
    pub modules: BTreeMap<String, toml::Table>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// The module's table, or an empty one.
    pub fn module_table(&self, name: &str) -> toml::Table {
        self.modules.get(name).cloned().unwrap_or_default()
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(content)?;
        validation::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// JSON file backing module storage.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Built-in modules to load. All of them when absent.
    #[serde(default)]
    pub modules: Option<Vec<String>>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            modules: None,
        }
    }
}

/// One IRC connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Hostname or address to connect to.
    pub server: String,
    /// TCP port.
    pub port: u16,
    /// Nickname to register with.
    #[serde(default = "default_username")]
    pub username: String,
    /// Command prefix, e.g. `%`.
    pub prefix: String,
    /// `USER` parameters. Derived from `username` when absent.
    #[serde(default)]
    pub ident: Option<IdentConfig>,
    /// Channels joined after the welcome reply.
    #[serde(default)]
    pub autojoin: Vec<String>,
    /// Hostname to access level.
    #[serde(default)]
    pub privileges: BTreeMap<String, AccessLevel>,
    #[serde(default = "default_quit_msg")]
    pub quit_msg: String,
    /// Inbound encoding label; `irc` means UTF-8 with a latin fallback.
    #[serde(default = "default_inencoding")]
    pub inencoding: String,
    /// Outbound encoding label.
    #[serde(default = "default_outencoding")]
    pub outencoding: String,
    #[serde(default = "default_true")]
    pub reconnect: bool,
    /// Connection attempts per connect cycle.
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: u32,
    /// Seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: f64,
    /// Seconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: f64,
    /// Seconds.
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval: f64,
}

impl ServerConfig {
    /// The `USER` parameters actually sent.
    pub fn ident(&self) -> IdentConfig {
        self.ident.clone().unwrap_or_else(|| IdentConfig {
            user: self.username.clone(),
            hostname: default_ident_part(),
            servername: default_ident_part(),
            realname: self.username.clone(),
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        seconds(self.connect_timeout)
    }

    pub fn reconnect_delay(&self) -> Duration {
        seconds(self.reconnect_delay)
    }

    pub fn keepalive_interval(&self) -> Duration {
        seconds(self.keepalive_interval)
    }
}

/// Saturating conversion; validation rejects values that would saturate.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}

/// Parameters of the `USER` registration command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentConfig {
    pub user: String,
    #[serde(default = "default_ident_part")]
    pub hostname: String,
    #[serde(default = "default_ident_part")]
    pub servername: String,
    pub realname: String,
}
