//! User-related types and state.

use std::collections::HashSet;
use std::fmt;

use slirc_proto::{IrcKey, Prefix};

use crate::access::AccessLevel;

/// A user the bot shares at least one channel with, or the bot itself.
#[derive(Debug, Clone)]
pub struct User {
    /// Nickname as the server last spelled it.
    pub nick: String,
    pub ident: Option<String>,
    pub host: Option<String>,
    /// Level resolved from the privilege table on the user's last message.
    pub access: AccessLevel,
    /// Channels this user is in.
    pub channels: HashSet<IrcKey>,
    pub away: bool,
    pub modes: HashSet<char>,
}

impl User {
    pub fn new(nick: &str) -> Self {
        Self {
            nick: nick.to_string(),
            ident: None,
            host: None,
            access: AccessLevel::Standard,
            channels: HashSet::new(),
            away: false,
            modes: HashSet::new(),
        }
    }

    pub fn from_prefix(prefix: &Prefix, access: AccessLevel) -> Self {
        let mut user = Self::new(&prefix.nick);
        user.ident = prefix.ident.clone();
        user.host = prefix.host.clone();
        user.access = access;
        user
    }

    pub fn key(&self) -> IrcKey {
        IrcKey::new(&self.nick)
    }

    pub fn as_sender(&self) -> Sender {
        Sender {
            nick: self.nick.clone(),
            ident: self.ident.clone(),
            host: self.host.clone(),
            access: self.access,
        }
    }
}

/// Immutable snapshot of a message's origin, handed to callbacks and commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub nick: String,
    pub ident: Option<String>,
    pub host: Option<String>,
    pub access: AccessLevel,
}

impl Sender {
    pub fn from_prefix(prefix: &Prefix, access: AccessLevel) -> Self {
        Self {
            nick: prefix.nick.clone(),
            ident: prefix.ident.clone(),
            host: prefix.host.clone(),
            access,
        }
    }

    /// `nick!ident@host`, with `*` standing in for unknown parts.
    pub fn hostmask(&self) -> String {
        format!(
            "{}!{}@{}",
            self.nick,
            self.ident.as_deref().unwrap_or("*"),
            self.host.as_deref().unwrap_or("*")
        )
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nick)
    }
}
