//! IRC case-mapping functions.
//!
//! IRC uses a special case-insensitive comparison where some characters
//! are considered equivalent (e.g., `[` and `{`). This implements the
//! `rfc1459` case mapping which is the most common, and [`IrcKey`], a map
//! key that normalizes once on construction.

use std::borrow::Borrow;
use std::fmt;

/// Convert a single character to IRC lowercase using RFC 1459 case mapping.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `[` → `{`
/// - `]` → `}`
/// - `\` → `|`
/// - `~` → `^`
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

/// A case-insensitive nickname or channel key.
///
/// The folded form is computed once; hashing and equality only look at
/// it. Use it as the key of any map indexed by a name the server treats
/// case-insensitively, and keep the display spelling next to the value.
///
/// ```
/// use slirc_proto::IrcKey;
///
/// assert_eq!(IrcKey::new("#Rust[dev]"), IrcKey::new("#rust{DEV}"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IrcKey(String);

impl IrcKey {
    /// Fold `name` into a key.
    pub fn new(name: &str) -> Self {
        IrcKey(irc_to_lower(name))
    }

    /// The folded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IrcKey {
    fn from(name: &str) -> Self {
        IrcKey::new(name)
    }
}

impl From<&String> for IrcKey {
    fn from(name: &String) -> Self {
        IrcKey::new(name)
    }
}

impl Borrow<str> for IrcKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IrcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IrcKey({:?})", self.0)
    }
}

impl fmt::Display for IrcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
