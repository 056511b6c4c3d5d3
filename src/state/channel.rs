//! Channel-related types and state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use slirc_proto::IrcKey;

/// A channel the bot is in.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Name as the server last spelled it.
    pub name: String,
    pub topic: Option<Topic>,
    /// Member user keys.
    pub users: HashSet<IrcKey>,
    pub modes: HashSet<char>,
}

/// Channel topic with its provenance, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub text: String,
    /// `nick!ident@host` of whoever set it, or a bare nick from 333.
    pub set_by: Option<String>,
    pub set_at: Option<DateTime<Utc>>,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            topic: None,
            users: HashSet::new(),
            modes: HashSet::new(),
        }
    }

    pub fn key(&self) -> IrcKey {
        IrcKey::new(&self.name)
    }

    /// Topic text, if one is known.
    pub fn topic_text(&self) -> Option<&str> {
        self.topic.as_ref().map(|t| t.text.as_str())
    }

    pub(super) fn topic_mut(&mut self) -> &mut Topic {
        self.topic.get_or_insert_with(|| Topic {
            text: String::new(),
            set_by: None,
            set_at: None,
        })
    }
}
