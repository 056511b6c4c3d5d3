//! Error types for the IRC protocol library.
//!
//! Transport-level failures are [`ProtocolError`]; failures to turn one
//! decoded line into a [`Message`](crate::Message) are [`MessageParseError`].

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a line.
    ///
    /// Carries the number of buffered bytes that never saw a terminator.
    #[error("partial line at end of stream ({0} bytes without terminator)")]
    PartialLine(usize),

    /// The encoding label is not known to the WHATWG registry.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The offending line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// A prefix marker was present but no command followed it.
    #[error("missing command")]
    MissingCommand,

    /// Command was neither a word nor a three digit numeric.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Not enough arguments for command.
    #[error("not enough arguments for {cmd}: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Command name.
        cmd: &'static str,
        /// Expected number of arguments.
        expected: usize,
        /// Actual number of arguments.
        got: usize,
    },
}
