//! Protocol events fanned out to registered callbacks.
//!
//! The read loop turns selected inbound commands into [`Event`]s after the
//! state lock is released; callbacks registered on a server with a
//! matching [`EventMask`] run synchronously, in registration order.

use std::ops::BitOr;
use std::sync::Arc;

use crate::network::Server;
use crate::state::Sender;

/// A user-visible protocol event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Privmsg {
        sender: Sender,
        receiver: String,
        text: String,
    },
    Notice {
        sender: Sender,
        receiver: String,
        text: String,
    },
    Join {
        sender: Sender,
        channel: String,
    },
    Part {
        sender: Sender,
        channel: String,
        reason: Option<String>,
    },
    Quit {
        sender: Sender,
        reason: Option<String>,
    },
    Kick {
        sender: Sender,
        channel: String,
        kicked: String,
        reason: Option<String>,
    },
    Nick {
        sender: Sender,
        new_nick: String,
    },
}

impl Event {
    pub fn kind(&self) -> EventMask {
        match self {
            Event::Privmsg { .. } => EventMask::PRIVMSG,
            Event::Notice { .. } => EventMask::NOTICE,
            Event::Join { .. } => EventMask::JOIN,
            Event::Part { .. } => EventMask::PART,
            Event::Quit { .. } => EventMask::QUIT,
            Event::Kick { .. } => EventMask::KICK,
            Event::Nick { .. } => EventMask::NICK,
        }
    }

    pub fn sender(&self) -> &Sender {
        match self {
            Event::Privmsg { sender, .. }
            | Event::Notice { sender, .. }
            | Event::Join { sender, .. }
            | Event::Part { sender, .. }
            | Event::Quit { sender, .. }
            | Event::Kick { sender, .. }
            | Event::Nick { sender, .. } => sender,
        }
    }
}

/// Set of event kinds a callback subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventMask(u8);

impl EventMask {
    pub const NONE: EventMask = EventMask(0);
    pub const PRIVMSG: EventMask = EventMask(1 << 0);
    pub const NOTICE: EventMask = EventMask(1 << 1);
    pub const JOIN: EventMask = EventMask(1 << 2);
    pub const PART: EventMask = EventMask(1 << 3);
    pub const QUIT: EventMask = EventMask(1 << 4);
    pub const KICK: EventMask = EventMask(1 << 5);
    pub const NICK: EventMask = EventMask(1 << 6);
    pub const ALL: EventMask = EventMask(0x7f);

    #[inline]
    pub fn contains(self, other: EventMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

/// Receiver of protocol events for one server.
///
/// Runs on the connection's read loop: anything slow belongs in a spawned
/// task.
pub trait EventCallback: Send + Sync {
    fn on_event(&self, server: &Arc<Server>, event: &Event);
}

impl<F> EventCallback for F
where
    F: Fn(&Arc<Server>, &Event) + Send + Sync,
{
    fn on_event(&self, server: &Arc<Server>, event: &Event) {
        self(server, event)
    }
}
