//! IRC numeric replies understood by the client.
//!
//! Only the numerics a bot needs for registration, channel tracking and
//! logging are named; every other three digit code parses as
//! [`Command::Numeric`](crate::Command::Numeric).
//!
//! # Reference
//! - RFC 1459 Section 6.2: Command responses
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

/// IRC server response code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info (name, version, user modes, channel modes)
    RPL_MYINFO = 4,
    /// 005 - Server supported features (ISUPPORT)
    RPL_ISUPPORT = 5,
    /// 250 - Highest connection count
    RPL_STATSCONN = 250,
    /// 251 - Users on the network
    RPL_LUSERCLIENT = 251,
    /// 252 - Operators online
    RPL_LUSEROP = 252,
    /// 253 - Unknown connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Channels formed
    RPL_LUSERCHANNELS = 254,
    /// 255 - Clients and servers on this server
    RPL_LUSERME = 255,
    /// 265 - Local users
    RPL_LOCALUSERS = 265,
    /// 266 - Global users
    RPL_GLOBALUSERS = 266,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 333 - Who set the topic and when
    RPL_TOPICWHOTIME = 333,
    /// 353 - Names list
    RPL_NAMREPLY = 353,
    /// 366 - End of names list
    RPL_ENDOFNAMES = 366,
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - MOTD start
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Creates a Response from a numeric code
    pub fn from_code(code: u16) -> Option<Response> {
        let resp = match code {
            1 => Response::RPL_WELCOME,
            2 => Response::RPL_YOURHOST,
            3 => Response::RPL_CREATED,
            4 => Response::RPL_MYINFO,
            5 => Response::RPL_ISUPPORT,
            250 => Response::RPL_STATSCONN,
            251 => Response::RPL_LUSERCLIENT,
            252 => Response::RPL_LUSEROP,
            253 => Response::RPL_LUSERUNKNOWN,
            254 => Response::RPL_LUSERCHANNELS,
            255 => Response::RPL_LUSERME,
            265 => Response::RPL_LOCALUSERS,
            266 => Response::RPL_GLOBALUSERS,
            332 => Response::RPL_TOPIC,
            333 => Response::RPL_TOPICWHOTIME,
            353 => Response::RPL_NAMREPLY,
            366 => Response::RPL_ENDOFNAMES,
            372 => Response::RPL_MOTD,
            375 => Response::RPL_MOTDSTART,
            376 => Response::RPL_ENDOFMOTD,
            _ => return None,
        };
        Some(resp)
    }

    /// The three digit wire form, e.g. `"001"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Response::RPL_WELCOME => "001",
            Response::RPL_YOURHOST => "002",
            Response::RPL_CREATED => "003",
            Response::RPL_MYINFO => "004",
            Response::RPL_ISUPPORT => "005",
            Response::RPL_STATSCONN => "250",
            Response::RPL_LUSERCLIENT => "251",
            Response::RPL_LUSEROP => "252",
            Response::RPL_LUSERUNKNOWN => "253",
            Response::RPL_LUSERCHANNELS => "254",
            Response::RPL_LUSERME => "255",
            Response::RPL_LOCALUSERS => "265",
            Response::RPL_GLOBALUSERS => "266",
            Response::RPL_TOPIC => "332",
            Response::RPL_TOPICWHOTIME => "333",
            Response::RPL_NAMREPLY => "353",
            Response::RPL_ENDOFNAMES => "366",
            Response::RPL_MOTD => "372",
            Response::RPL_MOTDSTART => "375",
            Response::RPL_ENDOFMOTD => "376",
        }
    }

    /// Check if this is a connection registration response (001-099)
    #[inline]
    pub fn is_registration(&self) -> bool {
        self.code() < 100
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a named numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResponseError;

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseResponseError);
        }
        s.parse::<u16>()
            .ok()
            .and_then(Response::from_code)
            .ok_or(ParseResponseError)
    }
}
