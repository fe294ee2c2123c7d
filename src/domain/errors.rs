//! Domain errors for the studyfeed client.

use thiserror::Error;

/// Domain-level errors that can occur in the feed synchronization subsystem.
///
/// None of these escape a component boundary as a panic; each operation
/// either returns one of these or degrades to a state transition.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Channel or HTTP transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server refused the credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Carries the server-reported detail verbatim for display.
    #[error("{0}")]
    LoginRejected(String),

    /// A payload could not be parsed.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The server answered with an error status.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Token storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation was called in the wrong state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}

impl DomainError {
    /// Whether the error is a transient transport fault that the reconnect
    /// timer is expected to recover from.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
