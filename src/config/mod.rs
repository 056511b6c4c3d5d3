//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions (Config, BotConfig, ServerConfig, IdentConfig)
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks run by [`Config::load`]

pub mod defaults;
mod types;
pub mod validation;

pub use types::{BotConfig, Config, ConfigError, IdentConfig, ServerConfig};
pub use validation::ValidationError;
