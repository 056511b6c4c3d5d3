//! IRC protocol event handlers.
//!
//! This module contains the Handler trait and the registry that routes
//! decoded server messages into [`ConnectionState`](crate::state::ConnectionState)
//! updates and callback events.

mod channel;
mod connection;
mod core;
mod messaging;
mod user;

pub use self::core::{Context, Effect, Handler, Registry};
pub use channel::{JoinHandler, KickHandler, NamesHandler, PartHandler, TopicHandler};
pub use connection::{
    IsupportHandler, MotdHandler, PingHandler, PongHandler, ServerInfoHandler, WelcomeHandler,
};
pub use messaging::{NoticeHandler, PrivmsgHandler};
pub use user::{NickHandler, QuitHandler};

use slirc_proto::{Command, Message};

/// Parameters of a numeric reply, empty for anything else.
pub(crate) fn numeric_args(msg: &Message) -> &[String] {
    match &msg.command {
        Command::Response(_, args) | Command::Numeric(_, args) => args,
        _ => &[],
    }
}
