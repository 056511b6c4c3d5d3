//! Per-connection model of channels and users.
//!
//! [`ConnectionState`] is mutated only by the read loop of its connection,
//! one protocol event at a time. Every operation keeps the membership
//! relation symmetric: a user lists a channel exactly when the channel
//! lists that user.

mod channel;
mod user;

pub use channel::{Channel, Topic};
pub use user::{Sender, User};

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use slirc_proto::{IrcKey, Isupport, Prefix};
use thiserror::Error;

use crate::access::AccessLevel;

/// An event referred to something the model does not track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("unknown user: {0}")]
    UnknownUser(String),
}

impl StateError {
    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownChannel(_) => "unknown_channel",
            Self::UnknownUser(_) => "unknown_user",
        }
    }
}

pub type StateResult<T = ()> = Result<T, StateError>;

/// Channels, users and server facts for one live session.
#[derive(Debug, Default)]
pub struct ConnectionState {
    users: HashMap<IrcKey, User>,
    channels: HashMap<IrcKey, Channel>,
    own: Option<IrcKey>,
    server_host: Option<String>,
    /// Accumulated 005 tokens.
    pub isupport: Isupport,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(&IrcKey::new(nick))
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&IrcKey::new(name))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// The bot's own user record, once welcomed.
    pub fn own_user(&self) -> Option<&User> {
        self.own.as_ref().and_then(|k| self.users.get(k))
    }

    pub fn own_nick(&self) -> Option<&str> {
        self.own_user().map(|u| u.nick.as_str())
    }

    pub fn is_own(&self, nick: &str) -> bool {
        self.own.as_ref().is_some_and(|k| *k == IrcKey::new(nick))
    }

    /// Server name taken from the welcome reply.
    pub fn server_host(&self) -> Option<&str> {
        self.server_host.as_deref()
    }

    /// Outbound line budget advertised by the server.
    pub fn max_line_len(&self) -> usize {
        self.isupport.max_line_len()
    }

    pub fn is_channel(&self, target: &str) -> bool {
        self.isupport.is_channel(target)
    }

    // ---------------------------------------------------------------------
    // Event application
    // ---------------------------------------------------------------------

    /// Refresh a tracked user from a message prefix and snapshot the origin.
    ///
    /// Untracked senders are not added; they only get a snapshot.
    pub fn observe_sender(&mut self, prefix: &Prefix, access: AccessLevel) -> Sender {
        match self.users.get_mut(&IrcKey::new(&prefix.nick)) {
            Some(user) => {
                if prefix.ident.is_some() {
                    user.ident = prefix.ident.clone();
                }
                if prefix.host.is_some() {
                    user.host = prefix.host.clone();
                }
                user.access = access;
                user.as_sender()
            }
            None => Sender::from_prefix(prefix, access),
        }
    }

    /// 001: remember who we are and which server greeted us.
    pub fn welcome(&mut self, own_nick: &str, server_host: &str) {
        let key = IrcKey::new(own_nick);
        self.users
            .entry(key.clone())
            .or_insert_with(|| User::new(own_nick));
        self.own = Some(key);
        self.server_host = Some(server_host.to_string());
    }

    /// JOIN. Our own join creates the channel; anyone else's requires it.
    pub fn join(&mut self, sender: &Sender, channel: &str) -> StateResult {
        let ckey = IrcKey::new(channel);
        if self.is_own(&sender.nick) {
            self.channels
                .entry(ckey.clone())
                .or_insert_with(|| Channel::new(channel));
        }
        if !self.channels.contains_key(&ckey) {
            return Err(StateError::UnknownChannel(channel.to_string()));
        }

        let ukey = IrcKey::new(&sender.nick);
        let user = self
            .users
            .entry(ukey.clone())
            .or_insert_with(|| User::new(&sender.nick));
        if sender.ident.is_some() {
            user.ident = sender.ident.clone();
        }
        if sender.host.is_some() {
            user.host = sender.host.clone();
        }
        user.access = sender.access;
        self.link(&ukey, &ckey);
        Ok(())
    }

    /// PART (and KICK). Our own departure drops the channel and every
    /// membership in it.
    pub fn part(&mut self, nick: &str, channel: &str) -> StateResult {
        let ckey = IrcKey::new(channel);
        let ukey = IrcKey::new(nick);
        if !self.channels.contains_key(&ckey) {
            return Err(StateError::UnknownChannel(channel.to_string()));
        }
        if !self.users.contains_key(&ukey) {
            return Err(StateError::UnknownUser(nick.to_string()));
        }

        if self.is_own(nick) {
            if let Some(chan) = self.channels.remove(&ckey) {
                for member in chan.users {
                    if let Some(user) = self.users.get_mut(&member) {
                        user.channels.remove(&ckey);
                    }
                    self.drop_if_orphaned(&member);
                }
            }
        } else {
            self.unlink(&ukey, &ckey);
            self.drop_if_orphaned(&ukey);
        }
        Ok(())
    }

    /// KICK: `kicked` leaves `channel`.
    pub fn kick(&mut self, channel: &str, kicked: &str) -> StateResult {
        self.part(kicked, channel)
    }

    /// QUIT. Our own quit wipes the session model.
    pub fn quit(&mut self, nick: &str) -> StateResult {
        if self.is_own(nick) {
            self.clear();
            return Ok(());
        }
        let ukey = IrcKey::new(nick);
        let user = self
            .users
            .remove(&ukey)
            .ok_or_else(|| StateError::UnknownUser(nick.to_string()))?;
        for ckey in &user.channels {
            if let Some(chan) = self.channels.get_mut(ckey) {
                chan.users.remove(&ukey);
            }
        }
        Ok(())
    }

    /// NICK: rekey the user in place, keeping memberships and access.
    pub fn rename(&mut self, old: &str, new: &str) -> StateResult {
        let old_key = IrcKey::new(old);
        let new_key = IrcKey::new(new);
        let mut user = self
            .users
            .remove(&old_key)
            .ok_or_else(|| StateError::UnknownUser(old.to_string()))?;

        if new_key != old_key {
            if let Some(stale) = self.users.remove(&new_key) {
                for ckey in &stale.channels {
                    if let Some(chan) = self.channels.get_mut(ckey) {
                        chan.users.remove(&new_key);
                    }
                }
            }
        }

        for ckey in &user.channels {
            if let Some(chan) = self.channels.get_mut(ckey) {
                chan.users.remove(&old_key);
                chan.users.insert(new_key.clone());
            }
        }

        if self.own.as_ref() == Some(&old_key) {
            self.own = Some(new_key.clone());
        }
        user.nick = new.to_string();
        self.users.insert(new_key, user);
        Ok(())
    }

    /// 353: link every listed nick to `channel`, minus membership symbols.
    ///
    /// Returns the number of names applied.
    pub fn names(&mut self, channel: &str, names: &str) -> StateResult<usize> {
        let ckey = IrcKey::new(channel);
        if !self.channels.contains_key(&ckey) {
            return Err(StateError::UnknownChannel(channel.to_string()));
        }
        let spec = self.isupport.prefix();
        let mut applied = 0;
        for entry in names.split(' ').filter(|e| !e.is_empty()) {
            let nick = spec.strip(entry);
            if nick.is_empty() {
                continue;
            }
            let ukey = IrcKey::new(nick);
            self.users
                .entry(ukey.clone())
                .or_insert_with(|| User::new(nick));
            self.link(&ukey, &ckey);
            applied += 1;
        }
        Ok(applied)
    }

    /// TOPIC: new text, set by `setter` just now.
    pub fn change_topic(&mut self, channel: &str, text: &str, setter: &Sender) -> StateResult {
        let chan = self.channel_mut(channel)?;
        let topic = chan.topic_mut();
        topic.text = text.to_string();
        topic.set_by = Some(setter.hostmask());
        topic.set_at = Some(Utc::now());
        Ok(())
    }

    /// 332: topic text on join.
    pub fn set_topic_text(&mut self, channel: &str, text: &str) -> StateResult {
        self.channel_mut(channel)?.topic_mut().text = text.to_string();
        Ok(())
    }

    /// 333: who set the topic and when (unix seconds).
    pub fn set_topic_who_time(&mut self, channel: &str, who: &str, timestamp: i64) -> StateResult {
        let topic = self.channel_mut(channel)?.topic_mut();
        topic.set_by = Some(who.to_string());
        topic.set_at = Utc.timestamp_opt(timestamp, 0).single();
        Ok(())
    }

    /// Forget everything; used on teardown.
    pub fn clear(&mut self) {
        self.users.clear();
        self.channels.clear();
        self.own = None;
        self.server_host = None;
        self.isupport.clear();
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn channel_mut(&mut self, name: &str) -> StateResult<&mut Channel> {
        self.channels
            .get_mut(&IrcKey::new(name))
            .ok_or_else(|| StateError::UnknownChannel(name.to_string()))
    }

    fn link(&mut self, ukey: &IrcKey, ckey: &IrcKey) {
        if let (Some(user), Some(chan)) = (self.users.get_mut(ukey), self.channels.get_mut(ckey)) {
            user.channels.insert(ckey.clone());
            chan.users.insert(ukey.clone());
        }
    }

    fn unlink(&mut self, ukey: &IrcKey, ckey: &IrcKey) {
        if let Some(user) = self.users.get_mut(ukey) {
            user.channels.remove(ckey);
        }
        if let Some(chan) = self.channels.get_mut(ckey) {
            chan.users.remove(ukey);
        }
    }

    /// Remove a non-own user that no longer shares a channel with us.
    fn drop_if_orphaned(&mut self, ukey: &IrcKey) {
        if self.own.as_ref() == Some(ukey) {
            return;
        }
        if self.users.get(ukey).is_some_and(|u| u.channels.is_empty()) {
            self.users.remove(ukey);
        }
    }

    /// Verify membership symmetry and the zero-channel policy.
    pub fn check_membership(&self) -> Result<(), String> {
        for (ukey, user) in &self.users {
            if ukey != &user.key() {
                return Err(format!("user {} stored under stale key {}", user.nick, ukey));
            }
            if user.channels.is_empty() && self.own.as_ref() != Some(ukey) {
                return Err(format!("user {} tracked without channels", user.nick));
            }
            for ckey in &user.channels {
                match self.channels.get(ckey) {
                    Some(chan) if chan.users.contains(ukey) => {}
                    Some(_) => return Err(format!("{} lists {} but not back", user.nick, ckey)),
                    None => return Err(format!("{} lists missing channel {}", user.nick, ckey)),
                }
            }
        }
        for (ckey, chan) in &self.channels {
            for ukey in &chan.users {
                match self.users.get(ukey) {
                    Some(user) if user.channels.contains(ckey) => {}
                    Some(_) => return Err(format!("{} lists {} but not back", chan.name, ukey)),
                    None => return Err(format!("{} lists missing user {}", chan.name, ukey)),
                }
            }
        }
        Ok(())
    }
}
