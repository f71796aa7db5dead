use std::io;
use thiserror::Error;

use super::types::{Address, SessionId};

/// Error types for meshcast
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Session already active: {0}")]
    SessionActive(SessionId),

    #[error("Session table full ({capacity} slots)")]
    TableFull { capacity: usize },

    #[error("Send to {to} failed: {reason}")]
    SendFailure { to: Address, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new malformed frame error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedFrame(msg.into())
    }

    /// Creates a new send failure
    pub fn send_failure(to: Address, reason: impl ToString) -> Self {
        Error::SendFailure {
            to,
            reason: reason.to_string(),
        }
    }

    /// Creates a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Error::Network(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new executor error
    pub fn executor(msg: impl Into<String>) -> Self {
        Error::Executor(msg.into())
    }

    /// Creates a new invalid address error
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Error::InvalidAddress(msg.into())
    }
}
