//! A single IRC protocol line.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// A parsed IRC message: optional origin plus a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Origin of the message, absent for lines the server sends bare.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Wrap a command with no prefix.
    pub fn new(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }

    /// Attach an origin.
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// The nickname of the origin, if any.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().map(|p| p.nick.as_str())
    }

    /// `PRIVMSG target :text`
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::new(Command::PRIVMSG(target.into(), text.into()))
    }

    /// `NOTICE target :text`
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::new(Command::NOTICE(target.into(), text.into()))
    }

    /// `JOIN channel`
    pub fn join(channel: impl Into<String>) -> Self {
        Message::new(Command::JOIN(channel.into()))
    }

    /// `PART channel`
    pub fn part(channel: impl Into<String>) -> Self {
        Message::new(Command::PART(channel.into(), None))
    }

    /// `NICK :nick`
    pub fn nick(nick: impl Into<String>) -> Self {
        Message::new(Command::NICK(nick.into()))
    }

    /// `USER user hostname servername :realname`
    pub fn user(
        user: impl Into<String>,
        hostname: impl Into<String>,
        servername: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        Message::new(Command::USER(
            user.into(),
            hostname.into(),
            servername.into(),
            realname.into(),
        ))
    }

    /// `QUIT :message`
    pub fn quit(message: impl Into<String>) -> Self {
        Message::new(Command::QUIT(Some(message.into())))
    }

    /// `PING :server`
    pub fn ping(server: impl Into<String>) -> Self {
        Message::new(Command::PING(server.into(), None))
    }

    /// `PONG token`
    pub fn pong(token: impl Into<String>) -> Self {
        Message::new(Command::PONG(token.into(), None))
    }
}

/// Split the parameter section of a line.
///
/// Tokens are separated by single spaces; the first token starting with
/// `:` loses the colon and absorbs the rest of the line verbatim. Empty
/// middle tokens produced by repeated spaces are skipped.
fn split_params(rest: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut remaining = rest;
    while !remaining.is_empty() {
        if let Some(trailing) = remaining.strip_prefix(':') {
            params.push(trailing.to_owned());
            break;
        }
        match remaining.split_once(' ') {
            Some((token, tail)) => {
                if !token.is_empty() {
                    params.push(token.to_owned());
                }
                remaining = tail;
            }
            None => {
                params.push(remaining.to_owned());
                break;
            }
        }
    }
    params
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let line = s.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        let (prefix, rest) = match line.strip_prefix(':') {
            Some(tail) => match tail.split_once(' ') {
                Some((origin, rest)) => (Some(Prefix::parse(origin)), rest),
                None => return Err(invalid(MessageParseError::MissingCommand)),
            },
            None => (None, line),
        };

        let rest = rest.trim_start_matches(' ');
        let (verb, params) = match rest.split_once(' ') {
            Some((verb, params)) => (verb, split_params(params)),
            None => (rest, Vec::new()),
        };
        if verb.is_empty() {
            return Err(invalid(MessageParseError::MissingCommand));
        }

        let command = Command::new(verb, params).map_err(invalid)?;
        Ok(Message { prefix, command })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    #[test]
    fn test_parse_privmsg_with_trailing() {
        let msg: Message = ":alice!al@host PRIVMSG #chan :hello  there :)".parse().unwrap();
        assert_eq!(msg.source_nickname(), Some("alice"));
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#chan".into(), "hello  there :)".into())
        );
    }

    #[test]
    fn test_parse_bare_ping() {
        let msg: Message = "PING :irc.example.org\r\n".parse().unwrap();
        assert!(msg.prefix.is_none());
        assert_eq!(msg.command, Command::PING("irc.example.org".into(), None));
    }

    #[test]
    fn test_parse_names_reply() {
        let msg: Message = ":srv 353 bot = #chan :@op +voice plain".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::Response(
                Response::RPL_NAMREPLY,
                vec![
                    "bot".into(),
                    "=".into(),
                    "#chan".into(),
                    "@op +voice plain".into()
                ]
            )
        );
    }

    #[test]
    fn test_empty_trailing_parameter() {
        let msg: Message = ":a!b@c PART #chan :".parse().unwrap();
        assert_eq!(msg.command, Command::PART("#chan".into(), Some(String::new())));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("".parse::<Message>().is_err());
        assert!(":only-prefix".parse::<Message>().is_err());
        assert!(":nick!u@h PRIVMSG".parse::<Message>().is_err());
    }

    #[test]
    fn test_display_with_prefix() {
        let msg = Message::privmsg("#c", "hi").with_prefix(Prefix::new("n", "u", "h"));
        assert_eq!(msg.to_string(), ":n!u@h PRIVMSG #c :hi");
    }
}
