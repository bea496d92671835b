//! Error types for session handling.
//!
//! Every failure here is local to one session: the registry removes the
//! session and carries on.

use std::fmt;
use std::io;

/// A message that does not follow the protocol grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    Empty,
    UnknownCommand(String),
    MissingArgument(&'static str),
    UnexpectedArgument(String),
    InvalidInt(String),
    InvalidFloat(String),
    InvalidBool(String),
    UnknownLight(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty message"),
            Self::UnknownCommand(word) => write!(f, "unknown command '{}'", word),
            Self::MissingArgument(what) => write!(f, "missing {}", what),
            Self::UnexpectedArgument(word) => write!(f, "unexpected argument '{}'", word),
            Self::InvalidInt(word) => write!(f, "'{}' is not an integer", word),
            Self::InvalidFloat(word) => write!(f, "'{}' is not a number", word),
            Self::InvalidBool(word) => write!(f, "'{}' is not a boolean", word),
            Self::UnknownLight(name) => write!(f, "no light named '{}'", name),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Inbound bytes that cannot be split into messages.
#[derive(Debug, Clone, PartialEq)]
pub enum FramingError {
    LineTooLong(usize),
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineTooLong(len) => write!(f, "unterminated line of {} bytes", len),
        }
    }
}

impl std::error::Error for FramingError {}

/// Why a session has to be torn down.
#[derive(Debug)]
pub enum SessionError {
    Io(io::Error),
    /// The peer closed its end.
    Closed,
    Framing(FramingError),
    Protocol(ProtocolError),
}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FramingError> for SessionError {
    fn from(e: FramingError) -> Self {
        Self::Framing(e)
    }
}

impl From<ProtocolError> for SessionError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Closed => write!(f, "connection closed by peer"),
            Self::Framing(e) => write!(f, "framing error: {}", e),
            Self::Protocol(e) => write!(f, "protocol error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Closed => None,
            Self::Framing(e) => Some(e),
            Self::Protocol(e) => Some(e),
        }
    }
}

pub type SessionResult<T = ()> = Result<T, SessionError>;
