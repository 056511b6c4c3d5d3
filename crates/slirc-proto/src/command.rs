//! IRC commands understood by the client.
//!
//! Inbound lines are parsed into a typed [`Command`] when the verb is one
//! the bot reacts to; every other verb is kept as [`Command::Raw`] and
//! every numeric outside [`Response`] as [`Command::Numeric`].

use std::borrow::Cow;
use std::fmt;

use crate::error::MessageParseError;
use crate::response::Response;

/// A parsed IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `NICK nickname`
    NICK(String),
    /// `USER user hostname servername :realname` (RFC 1459 form)
    USER(String, String, String, String),
    /// `JOIN channel`
    JOIN(String),
    /// `PART channel [:message]`
    PART(String, Option<String>),
    /// `KICK channel user [:comment]`
    KICK(String, String, Option<String>),
    /// `QUIT [:message]`
    QUIT(Option<String>),
    /// `TOPIC channel [:topic]`
    TOPIC(String, Option<String>),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),
    /// `PING server [server2]`
    PING(String, Option<String>),
    /// `PONG server [:token]`
    PONG(String, Option<String>),
    /// A named numeric reply.
    Response(Response, Vec<String>),
    /// Any other three digit numeric.
    Numeric(u16, Vec<String>),
    /// Any other verb.
    Raw(String, Vec<String>),
}

fn require(cmd: &'static str, args: &[String], expected: usize) -> Result<(), MessageParseError> {
    if args.len() < expected {
        return Err(MessageParseError::NotEnoughArguments {
            cmd,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

impl Command {
    /// Build a command from its verb and already split parameters.
    ///
    /// Verbs are matched case-insensitively. Extra parameters beyond the
    /// ones a typed variant keeps are dropped.
    pub fn new(cmd: &str, args: Vec<String>) -> Result<Command, MessageParseError> {
        if cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit()) {
            let code: u16 = cmd
                .parse()
                .map_err(|_| MessageParseError::InvalidCommand(cmd.to_owned()))?;
            return Ok(match Response::from_code(code) {
                Some(resp) => Command::Response(resp, args),
                None => Command::Numeric(code, args),
            });
        }

        if cmd.is_empty() || !cmd.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(MessageParseError::InvalidCommand(cmd.to_owned()));
        }

        let verb = cmd.to_ascii_uppercase();
        let mut it = args.iter().cloned();
        let command = match verb.as_str() {
            "NICK" => {
                require("NICK", &args, 1)?;
                Command::NICK(it.next().unwrap_or_default())
            }
            "USER" => {
                require("USER", &args, 4)?;
                Command::USER(
                    it.next().unwrap_or_default(),
                    it.next().unwrap_or_default(),
                    it.next().unwrap_or_default(),
                    it.next().unwrap_or_default(),
                )
            }
            "JOIN" => {
                require("JOIN", &args, 1)?;
                Command::JOIN(it.next().unwrap_or_default())
            }
            "PART" => {
                require("PART", &args, 1)?;
                Command::PART(it.next().unwrap_or_default(), it.next())
            }
            "KICK" => {
                require("KICK", &args, 2)?;
                Command::KICK(
                    it.next().unwrap_or_default(),
                    it.next().unwrap_or_default(),
                    it.next(),
                )
            }
            "QUIT" => Command::QUIT(it.next()),
            "TOPIC" => {
                require("TOPIC", &args, 1)?;
                Command::TOPIC(it.next().unwrap_or_default(), it.next())
            }
            "PRIVMSG" => {
                require("PRIVMSG", &args, 2)?;
                Command::PRIVMSG(it.next().unwrap_or_default(), it.next().unwrap_or_default())
            }
            "NOTICE" => {
                require("NOTICE", &args, 2)?;
                Command::NOTICE(it.next().unwrap_or_default(), it.next().unwrap_or_default())
            }
            "PING" => {
                require("PING", &args, 1)?;
                Command::PING(it.next().unwrap_or_default(), it.next())
            }
            "PONG" => {
                require("PONG", &args, 1)?;
                Command::PONG(it.next().unwrap_or_default(), it.next())
            }
            _ => Command::Raw(verb, args),
        };
        Ok(command)
    }

    /// The verb as it appears on the wire.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Command::NICK(_) => Cow::Borrowed("NICK"),
            Command::USER(..) => Cow::Borrowed("USER"),
            Command::JOIN(_) => Cow::Borrowed("JOIN"),
            Command::PART(..) => Cow::Borrowed("PART"),
            Command::KICK(..) => Cow::Borrowed("KICK"),
            Command::QUIT(_) => Cow::Borrowed("QUIT"),
            Command::TOPIC(..) => Cow::Borrowed("TOPIC"),
            Command::PRIVMSG(..) => Cow::Borrowed("PRIVMSG"),
            Command::NOTICE(..) => Cow::Borrowed("NOTICE"),
            Command::PING(..) => Cow::Borrowed("PING"),
            Command::PONG(..) => Cow::Borrowed("PONG"),
            Command::Response(resp, _) => Cow::Borrowed(resp.as_str()),
            Command::Numeric(code, _) => Cow::Owned(format!("{:03}", code)),
            Command::Raw(name, _) => Cow::Borrowed(name.as_str()),
        }
    }
}

/// True if `s` can only be sent as a trailing parameter.
pub fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Write `name` followed by `args`, colon-prefixing the last one only when
/// it would not survive the round trip otherwise.
fn write_cmd(f: &mut fmt::Formatter<'_>, name: &str, args: &[&str]) -> fmt::Result {
    f.write_str(name)?;
    if let Some((last, middle)) = args.split_last() {
        for arg in middle {
            write!(f, " {}", arg)?;
        }
        if needs_colon_prefix(last) {
            write!(f, " :{}", last)?;
        } else {
            write!(f, " {}", last)?;
        }
    }
    Ok(())
}

/// Like [`write_cmd`] but the last argument is always free-form text.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, name: &str, args: &[&str]) -> fmt::Result {
    f.write_str(name)?;
    if let Some((last, middle)) = args.split_last() {
        for arg in middle {
            write!(f, " {}", arg)?;
        }
        write!(f, " :{}", last)?;
    }
    Ok(())
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NICK(nick) => write_cmd_freeform(f, "NICK", &[nick]),
            Command::USER(user, host, server, real) => {
                write_cmd_freeform(f, "USER", &[user, host, server, real])
            }
            Command::JOIN(chan) => write_cmd(f, "JOIN", &[chan]),
            Command::PART(chan, None) => write_cmd(f, "PART", &[chan]),
            Command::PART(chan, Some(msg)) => write_cmd_freeform(f, "PART", &[chan, msg]),
            Command::KICK(chan, nick, None) => write_cmd(f, "KICK", &[chan, nick]),
            Command::KICK(chan, nick, Some(c)) => write_cmd_freeform(f, "KICK", &[chan, nick, c]),
            Command::QUIT(None) => f.write_str("QUIT"),
            Command::QUIT(Some(msg)) => write_cmd_freeform(f, "QUIT", &[msg]),
            Command::TOPIC(chan, None) => write_cmd(f, "TOPIC", &[chan]),
            Command::TOPIC(chan, Some(t)) => write_cmd_freeform(f, "TOPIC", &[chan, t]),
            Command::PRIVMSG(target, text) => write_cmd_freeform(f, "PRIVMSG", &[target, text]),
            Command::NOTICE(target, text) => write_cmd_freeform(f, "NOTICE", &[target, text]),
            Command::PING(server, None) => write_cmd_freeform(f, "PING", &[server]),
            Command::PING(server, Some(s2)) => write_cmd(f, "PING", &[server, s2]),
            Command::PONG(server, None) => write_cmd(f, "PONG", &[server]),
            Command::PONG(server, Some(token)) => write_cmd_freeform(f, "PONG", &[server, token]),
            Command::Response(resp, args) => write_cmd(f, resp.as_str(), &as_strs(args)),
            Command::Numeric(code, args) => write_cmd(f, &format!("{:03}", code), &as_strs(args)),
            Command::Raw(name, args) => write_cmd(f, name, &as_strs(args)),
        }
    }
}
