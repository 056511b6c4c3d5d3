//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use std::time::Duration;

use slirc_proto::line::{out_encoding_for_label, InEncoding};
use thiserror::Error;

use super::Config;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("at least one [servers.NAME] table is required")]
    NoServers,
    #[error("servers.{0}.server is required")]
    MissingHost(String),
    #[error("servers.{0}.port must be non-zero")]
    InvalidPort(String),
    #[error("servers.{0}.username is required")]
    MissingUsername(String),
    #[error("servers.{0}.prefix must not be empty")]
    EmptyPrefix(String),
    #[error("servers.{server}.{field} must be positive, got {value}")]
    NonPositiveDuration {
        server: String,
        field: &'static str,
        value: f64,
    },
    #[error("servers.{server}.{field} is too large, got {value}")]
    DurationTooLarge {
        server: String,
        field: &'static str,
        value: f64,
    },
    #[error("servers.{0}.reconnect_delay must not be negative")]
    NegativeDelay(String),
    #[error("servers.{0}.max_reconnects must be at least 1")]
    NoConnectAttempts(String),
    #[error("servers.{server}.{field}: unknown encoding '{label}'")]
    UnknownEncoding {
        server: String,
        field: &'static str,
        label: String,
    },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    for (name, server) in &config.servers {
        if server.server.is_empty() {
            errors.push(ValidationError::MissingHost(name.clone()));
        }
        if server.port == 0 {
            errors.push(ValidationError::InvalidPort(name.clone()));
        }
        if server.username.is_empty() {
            errors.push(ValidationError::MissingUsername(name.clone()));
        }
        if server.prefix.is_empty() {
            errors.push(ValidationError::EmptyPrefix(name.clone()));
        }

        for (field, value) in [
            ("connect_timeout", server.connect_timeout),
            ("keepalive_interval", server.keepalive_interval),
        ] {
            // NaN fails this comparison too.
            if !(value > 0.0) {
                errors.push(ValidationError::NonPositiveDuration {
                    server: name.clone(),
                    field,
                    value,
                });
            } else if Duration::try_from_secs_f64(value).is_err() {
                errors.push(ValidationError::DurationTooLarge {
                    server: name.clone(),
                    field,
                    value,
                });
            }
        }
        if !(server.reconnect_delay >= 0.0) {
            errors.push(ValidationError::NegativeDelay(name.clone()));
        } else {
            // The last attempt of a cycle waits the longest.
            let longest = server.reconnect_delay * f64::from(server.max_reconnects);
            if Duration::try_from_secs_f64(longest).is_err() {
                errors.push(ValidationError::DurationTooLarge {
                    server: name.clone(),
                    field: "reconnect_delay",
                    value: server.reconnect_delay,
                });
            }
        }
        if server.max_reconnects == 0 {
            errors.push(ValidationError::NoConnectAttempts(name.clone()));
        }

        if InEncoding::for_label(&server.inencoding).is_err() {
            errors.push(ValidationError::UnknownEncoding {
                server: name.clone(),
                field: "inencoding",
                label: server.inencoding.clone(),
            });
        }
        if out_encoding_for_label(&server.outencoding).is_err() {
            errors.push(ValidationError::UnknownEncoding {
                server: name.clone(),
                field: "outencoding",
                label: server.outencoding.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
