//! IRC message prefix.
//!
//! The prefix identifies the origin of a message: `nick!ident@host` for
//! users, a bare token for servers.
//!
//! # Reference
//! - RFC 1459 Section 2.3.1: Message format

use std::fmt;

/// Origin of a message.
///
/// Splitting follows the client convention: if the token has no `!`, the
/// whole token is the nickname and ident/host are absent. Server names
/// therefore land in `nick`, which is what the welcome handshake expects.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Prefix {
    /// Nickname, or the whole token when it has no `!`.
    pub nick: String,
    /// Ident (username) part.
    pub ident: Option<String>,
    /// Hostname part.
    pub host: Option<String>,
}

impl Prefix {
    /// Create a full user prefix.
    ///
    /// # Example
    ///
    /// ```
    /// use slirc_proto::Prefix;
    ///
    /// let prefix = Prefix::new("nick", "user", "host.example.com");
    /// assert_eq!(prefix.to_string(), "nick!user@host.example.com");
    /// ```
    pub fn new(nick: impl Into<String>, ident: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix {
            nick: nick.into(),
            ident: Some(ident.into()),
            host: Some(host.into()),
        }
    }

    /// Split a raw prefix token (without the leading `:`).
    pub fn parse(s: &str) -> Self {
        match s.split_once('!') {
            Some((nick, rest)) => {
                let (ident, host) = match rest.split_once('@') {
                    Some((ident, host)) => (ident, Some(host.to_owned())),
                    None => (rest, None),
                };
                Prefix {
                    nick: nick.to_owned(),
                    ident: Some(ident.to_owned()),
                    host,
                }
            }
            None => Prefix {
                nick: s.to_owned(),
                ident: None,
                host: None,
            },
        }
    }

    /// True if the prefix carries a host part, i.e. it names a user.
    pub fn is_user(&self) -> bool {
        self.host.is_some()
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::parse(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nick)?;
        if let Some(ident) = &self.ident {
            write!(f, "!{}", ident)?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{}", host)?;
        }
        Ok(())
    }
}
