//! Command argument signatures and binding.
//!
//! A signature is either positional (required names, optional names with
//! defaults, an optional variadic tail) or flag-style (`--name value`,
//! `--name=value`, bare `--switch`). Binding turns the tokens left after
//! command resolution into [`Arguments`].

use std::collections::BTreeMap;
use std::fmt;

use crate::error::BindingError;

/// A bound argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Float(x) => write!(f, "{x}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Type of a flag's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Str,
    Int,
    Float,
    /// A switch: present means true.
    Bool,
}

impl FlagKind {
    fn name(self) -> &'static str {
        match self {
            FlagKind::Str => "a string",
            FlagKind::Int => "an integer",
            FlagKind::Float => "a number",
            FlagKind::Bool => "true or false",
        }
    }

    fn parse(self, flag: &'static str, raw: &str) -> Result<ArgValue, BindingError> {
        let invalid = || BindingError::InvalidFlagValue {
            flag,
            kind: self.name(),
            value: raw.to_string(),
        };
        match self {
            FlagKind::Str => Ok(ArgValue::Str(raw.to_string())),
            FlagKind::Int => raw.parse().map(ArgValue::Int).map_err(|_| invalid()),
            FlagKind::Float => raw.parse().map(ArgValue::Float).map_err(|_| invalid()),
            FlagKind::Bool => match raw {
                "true" | "yes" | "on" | "1" => Ok(ArgValue::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(ArgValue::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }
}

/// A named, typed flag with its default.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    pub name: &'static str,
    pub kind: FlagKind,
    pub default: ArgValue,
}

impl Flag {
    pub fn string(name: &'static str, default: &str) -> Self {
        Flag {
            name,
            kind: FlagKind::Str,
            default: ArgValue::Str(default.to_string()),
        }
    }

    pub fn int(name: &'static str, default: i64) -> Self {
        Flag {
            name,
            kind: FlagKind::Int,
            default: ArgValue::Int(default),
        }
    }

    pub fn float(name: &'static str, default: f64) -> Self {
        Flag {
            name,
            kind: FlagKind::Float,
            default: ArgValue::Float(default),
        }
    }

    pub fn switch(name: &'static str) -> Self {
        Flag {
            name,
            kind: FlagKind::Bool,
            default: ArgValue::Bool(false),
        }
    }
}

/// Shape of the arguments a command accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Signature {
    Positional {
        required: Vec<&'static str>,
        optional: Vec<(&'static str, &'static str)>,
        variadic: Option<&'static str>,
    },
    Flags(Vec<Flag>),
}

impl Default for Signature {
    /// Accepts anything; the handler reads the raw tokens.
    fn default() -> Self {
        Signature::Positional {
            required: Vec::new(),
            optional: Vec::new(),
            variadic: Some("args"),
        }
    }
}

impl Signature {
    /// No arguments at all. Empty tokens left by trailing spaces are
    /// ignored.
    pub fn none() -> Self {
        Signature::Positional {
            required: Vec::new(),
            optional: Vec::new(),
            variadic: None,
        }
    }

    pub fn positional(required: &[&'static str]) -> Self {
        Signature::Positional {
            required: required.to_vec(),
            optional: Vec::new(),
            variadic: None,
        }
    }

    /// Add an optional positional with its default.
    ///
    /// Has no effect on flag signatures.
    pub fn optional(mut self, name: &'static str, default: &'static str) -> Self {
        if let Signature::Positional { optional, .. } = &mut self {
            optional.push((name, default));
        }
        self
    }

    /// Collect remaining tokens under `name`.
    pub fn variadic(mut self, name: &'static str) -> Self {
        if let Signature::Positional { variadic, .. } = &mut self {
            *variadic = Some(name);
        }
        self
    }

    pub fn flags(flags: Vec<Flag>) -> Self {
        Signature::Flags(flags)
    }

    /// Bind the tokens that follow the command path.
    pub fn bind(&self, tokens: &[String]) -> Result<Arguments, BindingError> {
        match self {
            Signature::Positional {
                required,
                optional,
                variadic,
            } => bind_positional(required, optional, *variadic, tokens),
            Signature::Flags(flags) => bind_flags(flags, tokens),
        }
    }

    /// Usage text for help, e.g. `<channel> [reason=bye] [args...]`.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        match self {
            Signature::Positional {
                required,
                optional,
                variadic,
            } => {
                parts.extend(required.iter().map(|name| format!("<{name}>")));
                parts.extend(optional.iter().map(|(name, default)| {
                    if default.is_empty() {
                        format!("[{name}]")
                    } else {
                        format!("[{name}={default}]")
                    }
                }));
                if let Some(name) = variadic {
                    parts.push(format!("[{name}...]"));
                }
            }
            Signature::Flags(flags) => {
                parts.extend(flags.iter().map(|flag| match flag.kind {
                    FlagKind::Bool => format!("[--{}]", flag.name),
                    _ => format!("[--{}={}]", flag.name, flag.default),
                }));
            }
        }
        parts.join(" ")
    }
}

fn bind_positional(
    required: &[&'static str],
    optional: &[(&'static str, &'static str)],
    variadic: Option<&'static str>,
    tokens: &[String],
) -> Result<Arguments, BindingError> {
    let tokens = if required.is_empty() && optional.is_empty() && variadic.is_none() {
        let used = tokens.iter().rposition(|t| !t.is_empty()).map_or(0, |i| i + 1);
        &tokens[..used]
    } else {
        tokens
    };
    if let Some(missing) = required.get(tokens.len()) {
        return Err(BindingError::MissingArgument(missing));
    }
    let max = required.len() + optional.len();
    if variadic.is_none() && tokens.len() > max {
        return Err(BindingError::TooManyArguments {
            max,
            got: tokens.len(),
        });
    }

    let mut args = Arguments::new(tokens);
    let mut tokens = tokens.iter();
    for name in required {
        if let Some(token) = tokens.next() {
            args.values.insert(name, ArgValue::Str(token.clone()));
        }
    }
    for (name, default) in optional {
        let value = tokens.next().map_or_else(|| default.to_string(), Clone::clone);
        args.values.insert(name, ArgValue::Str(value));
    }
    args.rest = tokens.cloned().collect();
    Ok(args)
}

fn bind_flags(flags: &[Flag], tokens: &[String]) -> Result<Arguments, BindingError> {
    let mut args = Arguments::new(tokens);
    for flag in flags {
        args.values.insert(flag.name, flag.default.clone());
    }

    let mut tokens = tokens.iter().filter(|t| !t.is_empty());
    while let Some(token) = tokens.next() {
        let Some(body) = token.strip_prefix("--") else {
            return Err(BindingError::UnexpectedPositional(token.clone()));
        };
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let flag = flags
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| BindingError::UnknownFlag(name.to_string()))?;

        let value = match (flag.kind, inline) {
            (FlagKind::Bool, None) => ArgValue::Bool(true),
            (kind, Some(raw)) => kind.parse(flag.name, raw)?,
            (kind, None) => {
                let raw = tokens
                    .next()
                    .ok_or(BindingError::MissingFlagValue(flag.name))?;
                kind.parse(flag.name, raw)?
            }
        };
        args.values.insert(flag.name, value);
    }
    Ok(args)
}

/// Arguments bound for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: BTreeMap<&'static str, ArgValue>,
    rest: Vec<String>,
    raw: Vec<String>,
}

impl Arguments {
    fn new(raw: &[String]) -> Self {
        Arguments {
            values: BTreeMap::new(),
            rest: Vec::new(),
            raw: raw.to_vec(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&ArgValue, BindingError> {
        self.values
            .get(name)
            .ok_or_else(|| BindingError::NoSuchArgument(name.to_string()))
    }

    /// String form of any bound value.
    pub fn string(&self, name: &str) -> Result<String, BindingError> {
        self.get(name).map(ToString::to_string)
    }

    pub fn str(&self, name: &str) -> Result<&str, BindingError> {
        match self.get(name)? {
            ArgValue::Str(s) => Ok(s),
            _ => Err(BindingError::NoSuchArgument(name.to_string())),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, BindingError> {
        match self.get(name)? {
            ArgValue::Int(i) => Ok(*i),
            _ => Err(BindingError::NoSuchArgument(name.to_string())),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64, BindingError> {
        match self.get(name)? {
            ArgValue::Float(x) => Ok(*x),
            ArgValue::Int(i) => Ok(*i as f64),
            _ => Err(BindingError::NoSuchArgument(name.to_string())),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, BindingError> {
        match self.get(name)? {
            ArgValue::Bool(b) => Ok(*b),
            _ => Err(BindingError::NoSuchArgument(name.to_string())),
        }
    }

    /// Tokens captured by the variadic tail.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Every token after the command path, unbound.
    pub fn raw(&self) -> &[String] {
        &self.raw
    }
}
