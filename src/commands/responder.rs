//! Per-invocation reply handle.

use std::ops::Deref;
use std::sync::{Arc, Weak};

use slirc_proto::irc_eq;

use crate::bot::Bot;
use crate::network::Server;
use crate::state::Sender;

/// Outbound message kind for [`Responder::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Privmsg,
    Notice,
}

/// Everything known about one command invocation.
pub struct Invocation {
    pub server: Arc<Server>,
    pub sender: Sender,
    /// Where replies go: the channel for channel messages, else the sender.
    pub target: String,
    /// The PRIVMSG receiver as addressed.
    pub receiver: String,
    /// Argument text after the command path, spacing preserved.
    pub line: String,
    /// Resolved command path.
    pub path: Vec<String>,
    pub bot: Weak<Bot>,
}

/// Cheap to clone; every clone answers the same invocation.
#[derive(Clone)]
pub struct Responder(Arc<Invocation>);

impl Responder {
    pub fn new(invocation: Invocation) -> Self {
        Self(Arc::new(invocation))
    }

    /// The bot, unless it is shutting down.
    pub fn bot(&self) -> Option<Arc<Bot>> {
        self.0.bot.upgrade()
    }

    /// PRIVMSG to the reply target.
    pub fn reply(&self, text: &str) -> bool {
        self.send(text, None, ReplyKind::Privmsg)
    }

    /// PRIVMSG to an explicit target.
    pub fn reply_to(&self, target: &str, text: &str) -> bool {
        self.send(text, Some(target), ReplyKind::Privmsg)
    }

    /// NOTICE to the sender.
    pub fn notice(&self, text: &str) -> bool {
        self.send(text, None, ReplyKind::Notice)
    }

    /// Send exactly one line.
    ///
    /// A PRIVMSG to anyone but the sender is addressed as `nick: text`;
    /// notices are never prefixed.
    pub fn send(&self, text: &str, target: Option<&str>, kind: ReplyKind) -> bool {
        let nick = self.0.sender.nick.as_str();
        match kind {
            ReplyKind::Privmsg => {
                let target = target.unwrap_or(&self.0.target);
                if irc_eq(target, nick) {
                    self.0.server.privmsg(target, text)
                } else {
                    self.0.server.privmsg(target, &format!("{nick}: {text}"))
                }
            }
            ReplyKind::Notice => self.0.server.notice(target.unwrap_or(nick), text),
        }
    }
}

impl Deref for Responder {
    type Target = Invocation;

    fn deref(&self) -> &Invocation {
        &self.0
    }
}
