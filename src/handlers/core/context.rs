//! Handler context and the effects a handler leaves behind.
//!
//! Handlers run while the read loop holds the state write lock, so they
//! never send or call back directly. They push [`Effect`]s instead, which
//! the read loop applies once the lock is released.

use slirc_proto::Message;

use crate::config::ServerConfig;
use crate::events::Event;
use crate::state::{ConnectionState, Sender};

/// Deferred work produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Queue a line to the server.
    Send(Message),
    /// Fan an event out to callbacks.
    Event(Event),
    /// Registration completed; arm the keepalive timer.
    Welcomed,
}

/// Handler context passed to each protocol handler.
pub struct Context<'a> {
    /// Configured name of the server this message came from.
    pub server_name: &'a str,
    pub config: &'a ServerConfig,
    /// Connection model, write-locked for the duration of the handler.
    pub state: &'a mut ConnectionState,
    /// Origin of the message, refreshed from the privilege table.
    pub sender: Option<Sender>,
    pub effects: Vec<Effect>,
}

impl<'a> Context<'a> {
    pub fn new(
        server_name: &'a str,
        config: &'a ServerConfig,
        state: &'a mut ConnectionState,
        sender: Option<Sender>,
    ) -> Self {
        Self {
            server_name,
            config,
            state,
            sender,
            effects: Vec::new(),
        }
    }

    pub fn send(&mut self, msg: Message) {
        self.effects.push(Effect::Send(msg));
    }

    pub fn emit(&mut self, event: Event) {
        self.effects.push(Effect::Event(event));
    }

    /// The message origin, required by every user-originated command.
    pub fn require_sender(&self, cmd: &'static str) -> Result<Sender, crate::error::HandlerError> {
        self.sender
            .clone()
            .ok_or(crate::error::HandlerError::MissingPrefix(cmd))
    }

    /// Consume the context, keeping only the effects.
    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}
