//! ISUPPORT (RPL_ISUPPORT / 005) server capability table.
//!
//! Values are typed on parse: integers first, then floats, otherwise kept
//! as text. A bare key is recorded as a flag.

use std::collections::HashMap;
use std::fmt;

/// Channel prefixes assumed before the server advertises `CHANTYPES`.
pub const DEFAULT_CHANTYPES: &str = "#&";

/// Membership prefixes assumed before the server advertises `PREFIX`.
pub const DEFAULT_PREFIX: &str = "(ov)@+";

/// Outbound line length used until the server advertises `TOPICLEN`.
pub const DEFAULT_MAX_LINE_LEN: usize = 300;

/// One advertised value.
#[derive(Clone, Debug, PartialEq)]
pub enum IsupportValue {
    /// Key present without a value.
    Flag,
    /// Value parsed as an integer.
    Int(i64),
    /// Value parsed as a float.
    Float(f64),
    /// Anything else.
    Text(String),
}

impl IsupportValue {
    /// Type a raw `KEY=value` value.
    pub fn parse(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            IsupportValue::Int(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            IsupportValue::Float(f)
        } else {
            IsupportValue::Text(raw.to_owned())
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IsupportValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for IsupportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsupportValue::Flag => f.write_str("true"),
            IsupportValue::Int(i) => write!(f, "{}", i),
            IsupportValue::Float(x) => write!(f, "{}", x),
            IsupportValue::Text(s) => f.write_str(s),
        }
    }
}

/// Accumulated ISUPPORT tokens for one connection.
///
/// Later 005 lines overwrite earlier values for the same key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Isupport {
    entries: HashMap<String, IsupportValue>,
}

impl Isupport {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the arguments of one 005 reply.
    ///
    /// The first argument (our nickname) and the last (the human readable
    /// "are supported by this server" text) are skipped.
    ///
    /// ```
    /// use slirc_proto::isupport::{Isupport, IsupportValue};
    ///
    /// let mut isupport = Isupport::new();
    /// isupport.apply_response_args(&["bot", "TOPICLEN=390", "EXCEPTS", "are supported"]);
    /// assert_eq!(isupport.get("TOPICLEN"), Some(&IsupportValue::Int(390)));
    /// assert_eq!(isupport.get("EXCEPTS"), Some(&IsupportValue::Flag));
    /// ```
    pub fn apply_response_args<S: AsRef<str>>(&mut self, args: &[S]) {
        if args.len() < 2 {
            return;
        }
        for token in &args[1..args.len() - 1] {
            self.apply_token(token.as_ref());
        }
    }

    /// Record a single `KEY` or `KEY=value` token.
    pub fn apply_token(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        match token.split_once('=') {
            Some((key, value)) => {
                self.entries
                    .insert(key.to_owned(), IsupportValue::parse(value));
            }
            None => {
                self.entries.insert(token.to_owned(), IsupportValue::Flag);
            }
        }
    }

    /// Look up a key exactly as advertised.
    pub fn get(&self, key: &str) -> Option<&IsupportValue> {
        self.entries.get(key)
    }

    /// Iterate over all advertised keys.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IsupportValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of advertised keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been advertised yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything; used when a connection is reset.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Characters that start a channel name.
    pub fn chantypes(&self) -> String {
        match self.get("CHANTYPES") {
            Some(IsupportValue::Text(s)) => s.clone(),
            _ => DEFAULT_CHANTYPES.to_owned(),
        }
    }

    /// True if `target` names a channel on this server.
    pub fn is_channel(&self, target: &str) -> bool {
        target
            .chars()
            .next()
            .is_some_and(|c| self.chantypes().contains(c))
    }

    /// The `PREFIX` membership table.
    pub fn prefix(&self) -> PrefixSpec {
        let raw = match self.get("PREFIX") {
            Some(IsupportValue::Text(s)) => s.as_str(),
            _ => DEFAULT_PREFIX,
        };
        PrefixSpec::parse(raw).unwrap_or_else(PrefixSpec::fallback)
    }

    /// Maximum outbound line length in characters.
    pub fn max_line_len(&self) -> usize {
        self.get("TOPICLEN")
            .and_then(IsupportValue::as_int)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_LINE_LEN)
    }
}

/// Parsed `PREFIX` token: mode letters and their membership symbols.
///
/// ```
/// use slirc_proto::isupport::PrefixSpec;
///
/// let spec = PrefixSpec::parse("(ov)@+").unwrap();
/// assert_eq!(spec.prefix_for_mode('o'), Some('@'));
/// assert_eq!(spec.strip("+voice"), "voice");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixSpec {
    /// Mode characters (e.g. `ov`).
    pub modes: String,
    /// Prefix symbols (e.g. `@+`).
    pub prefixes: String,
}

impl PrefixSpec {
    /// Parse a `PREFIX` value like `(ov)@+`, or a bare symbol list.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(rest) = s.strip_prefix('(') {
            let (modes, prefixes) = rest.split_once(')')?;
            if modes.is_empty() || prefixes.is_empty() {
                return None;
            }
            Some(PrefixSpec {
                modes: modes.to_owned(),
                prefixes: prefixes.to_owned(),
            })
        } else if !s.is_empty() {
            Some(PrefixSpec {
                modes: String::new(),
                prefixes: s.to_owned(),
            })
        } else {
            None
        }
    }

    fn fallback() -> Self {
        PrefixSpec {
            modes: "ov".to_owned(),
            prefixes: "@+".to_owned(),
        }
    }

    /// True if `c` is a membership symbol.
    pub fn is_prefix(&self, c: char) -> bool {
        self.prefixes.contains(c)
    }

    /// Symbol for a mode letter.
    pub fn prefix_for_mode(&self, mode: char) -> Option<char> {
        let idx = self.modes.chars().position(|m| m == mode)?;
        self.prefixes.chars().nth(idx)
    }

    /// Remove one leading membership symbol from a NAMES entry.
    pub fn strip<'n>(&self, name: &'n str) -> &'n str {
        match name.chars().next() {
            Some(c) if self.is_prefix(c) => &name[c.len_utf8()..],
            _ => name,
        }
    }
}
