//! Access levels and the per-server privilege table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller privilege, totally ordered from `Banned` to `Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    Banned = 0,
    #[default]
    Standard = 1,
    Trusted = 2,
    Elevated = 3,
    Op = 4,
    Admin = 5,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 6] = [
        AccessLevel::Banned,
        AccessLevel::Standard,
        AccessLevel::Trusted,
        AccessLevel::Elevated,
        AccessLevel::Op,
        AccessLevel::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Banned => "BANNED",
            AccessLevel::Standard => "STANDARD",
            AccessLevel::Trusted => "TRUSTED",
            AccessLevel::Elevated => "ELEVATED",
            AccessLevel::Op => "OP",
            AccessLevel::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown access level: {0}")]
pub struct UnknownAccessLevel(pub String);

impl FromStr for AccessLevel {
    type Err = UnknownAccessLevel;

    /// Level names are matched exactly, upper case only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownAccessLevel(s.to_string()))
    }
}

/// Hostname to access level for one server.
///
/// Seeded from configuration, changed at runtime by admin commands and
/// consulted for every prefixed message.
#[derive(Debug, Default)]
pub struct PrivilegeTable {
    entries: RwLock<HashMap<String, AccessLevel>>,
}

impl PrivilegeTable {
    pub fn new(seed: &BTreeMap<String, AccessLevel>) -> Self {
        Self {
            entries: RwLock::new(seed.iter().map(|(h, l)| (h.clone(), *l)).collect()),
        }
    }

    /// Level for a sender's hostname; unknown or absent hosts are `Standard`.
    pub fn resolve(&self, host: Option<&str>) -> AccessLevel {
        host.and_then(|h| self.entries.read().get(h).copied())
            .unwrap_or(AccessLevel::Standard)
    }

    /// Set a host's level, returning the previous one.
    pub fn set(&self, host: &str, level: AccessLevel) -> Option<AccessLevel> {
        self.entries.write().insert(host.to_string(), level)
    }

    pub fn snapshot(&self) -> BTreeMap<String, AccessLevel> {
        self.entries
            .read()
            .iter()
            .map(|(h, l)| (h.clone(), *l))
            .collect()
    }
}
