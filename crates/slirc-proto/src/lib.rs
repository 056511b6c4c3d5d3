//! # slirc-proto
//!
//! IRC line protocol for the client side: message parsing, outbound line
//! sanitation, ISUPPORT tracking and a tokio line codec with the
//! UTF-8/latin fallback decoding IRC networks still need.
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_proto::{Command, Message};
//!
//! let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("nick"));
//! assert!(matches!(msg.command, Command::PRIVMSG(_, _)));
//!
//! let reply = Message::privmsg("#channel", "Hi there");
//! assert_eq!(reply.to_string(), "PRIVMSG #channel :Hi there");
//! ```
//!
//! ## Acknowledgments
//!
//! This project was inspired by the architectural patterns established by
//! [Aaron Weiss (aatxe)](https://github.com/aatxe) in the
//! [irc](https://github.com/aatxe/irc) crate.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod command;
pub mod encode;
pub mod error;
pub mod isupport;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower, IrcKey};
pub use self::command::Command;
pub use self::encode::sanitize_line;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::isupport::{Isupport, IsupportValue, PrefixSpec};
#[cfg(feature = "tokio")]
pub use self::line::{InEncoding, LineCodec};
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::response::Response;
