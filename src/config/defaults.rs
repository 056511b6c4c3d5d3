//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::path::PathBuf;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_data_path() -> PathBuf {
    PathBuf::from("data.json")
}

// =============================================================================
// Identity Defaults
// =============================================================================

pub fn default_username() -> String {
    "slircbot".to_string()
}

pub fn default_quit_msg() -> String {
    "slircbot quitting...".to_string()
}

pub fn default_ident_part() -> String {
    "-".to_string()
}

// =============================================================================
// Encoding Defaults
// =============================================================================

/// `irc` decodes UTF-8 and falls back to windows-1252 per line.
pub fn default_inencoding() -> String {
    "irc".to_string()
}

pub fn default_outencoding() -> String {
    "utf-8".to_string()
}

// =============================================================================
// Connection Policy Defaults
// =============================================================================

pub fn default_max_reconnects() -> u32 {
    5
}

/// Seconds allowed for a single connection attempt.
pub fn default_connect_timeout() -> f64 {
    10.0
}

/// Base delay in seconds between failed attempts; attempt `n` waits `n` times this.
pub fn default_reconnect_delay() -> f64 {
    1.0
}

/// Seconds between keepalive checks.
pub fn default_keepalive_interval() -> f64 {
    60.0
}
