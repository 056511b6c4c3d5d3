//! Unified error handling for slircbot.
//!
//! Each layer has its own enum: transport failures end one connection,
//! handler errors are logged and skipped, dispatch errors become at most
//! one reply line to whoever issued the command.

use std::fmt;

use thiserror::Error;

use crate::access::AccessLevel;
use crate::state::StateError;

// ============================================================================
// Transport Errors (connection lifecycle)
// ============================================================================

/// Failures that end a connection attempt or a whole connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect to {addr} timed out after {secs:.1}s")]
    Timeout { addr: String, secs: f64 },

    #[error("gave up after {attempts} connection attempts")]
    Exhausted { attempts: u32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "connect_timeout",
            Self::Exhausted { .. } => "attempts_exhausted",
            Self::Io(_) => "io_error",
        }
    }
}

// ============================================================================
// Handler Errors (protocol event processing)
// ============================================================================

/// Errors raised while applying one inbound protocol message.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0} without a sender prefix")]
    MissingPrefix(&'static str),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("malformed {cmd} parameter: {value}")]
    Malformed { cmd: &'static str, value: String },
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPrefix(_) => "missing_prefix",
            Self::State(e) => e.error_code(),
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Result type for protocol handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Binding Errors (command arguments)
// ============================================================================

/// The invocation's arguments do not fit the command's signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    #[error("expected at most {max} arguments, got {got}")]
    TooManyArguments { max: usize, got: usize },

    #[error("unknown flag '--{0}'")]
    UnknownFlag(String),

    #[error("flag '--{0}' needs a value")]
    MissingFlagValue(&'static str),

    #[error("flag '--{flag}' expects {kind}, got '{value}'")]
    InvalidFlagValue {
        flag: &'static str,
        kind: &'static str,
        value: String,
    },

    #[error("unexpected positional argument '{0}'")]
    UnexpectedPositional(String),

    #[error("no argument named '{0}'")]
    NoSuchArgument(String),
}

// ============================================================================
// Dispatch Errors (command invocation)
// ============================================================================

/// How a handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Error,
    Panic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Error => "Error",
            FailureKind::Panic => "Panic",
        })
    }
}

/// Outcome of a command invocation that did not succeed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no command matches '{0}'")]
    Lookup(String),

    #[error("requires {required}, caller has {actual}")]
    PermissionDenied {
        required: AccessLevel,
        actual: AccessLevel,
    },

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("{kind}: {message}")]
    Failure { kind: FailureKind, message: String },
}

pub const ACCESS_DENIED_REPLY: &str = "You do not have access to this command";
pub const WRONG_ARGUMENTS_REPLY: &str = "Wrong number of arguments";

impl DispatchError {
    /// Wrap a handler error, folding argument errors raised by the handler
    /// itself back into [`DispatchError::Binding`].
    pub fn from_handler(err: anyhow::Error) -> Self {
        match err.downcast::<BindingError>() {
            Ok(binding) => DispatchError::Binding(binding),
            Err(err) => DispatchError::Failure {
                kind: FailureKind::Error,
                message: one_line(&format!("{err:#}")),
            },
        }
    }

    pub fn panic(message: &str) -> Self {
        DispatchError::Failure {
            kind: FailureKind::Panic,
            message: one_line(message),
        }
    }

    /// The single line sent back to the caller, if any.
    pub fn reply_text(&self) -> Option<String> {
        match self {
            Self::Lookup(_) => None,
            Self::PermissionDenied { .. } => Some(ACCESS_DENIED_REPLY.to_string()),
            Self::Binding(_) => Some(WRONG_ARGUMENTS_REPLY.to_string()),
            Self::Failure { .. } => Some(self.to_string()),
        }
    }

    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "lookup",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Binding(_) => "binding",
            Self::Failure {
                kind: FailureKind::Error,
                ..
            } => "handler_error",
            Self::Failure {
                kind: FailureKind::Panic,
                ..
            } => "handler_panic",
        }
    }
}

fn one_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text() {
        assert_eq!(DispatchError::Lookup("nope".into()).reply_text(), None);
        let denied = DispatchError::PermissionDenied {
            required: AccessLevel::Admin,
            actual: AccessLevel::Standard,
        };
        assert_eq!(denied.reply_text().as_deref(), Some(ACCESS_DENIED_REPLY));
        let binding = DispatchError::Binding(BindingError::MissingArgument("channel"));
        assert_eq!(binding.reply_text().as_deref(), Some(WRONG_ARGUMENTS_REPLY));
    }

    #[test]
    fn test_handler_error_is_single_line() {
        let err = anyhow::anyhow!("line one\nline two").context("while fetching");
        let dispatch = DispatchError::from_handler(err);
        assert_eq!(
            dispatch.reply_text().as_deref(),
            Some("Error: while fetching: line one line two")
        );
    }

    #[test]
    fn test_handler_binding_error_downcasts() {
        let err = anyhow::Error::new(BindingError::TooManyArguments { max: 1, got: 3 });
        assert!(matches!(
            DispatchError::from_handler(err),
            DispatchError::Binding(BindingError::TooManyArguments { max: 1, got: 3 })
        ));
    }

    #[test]
    fn test_panic_reply() {
        let dispatch = DispatchError::panic("index out of bounds");
        assert_eq!(dispatch.reply_text().as_deref(), Some("Panic: index out of bounds"));
        assert_eq!(dispatch.error_code(), "handler_panic");
    }
}
