//! Error types for media channel operations

use thiserror::Error;

/// Errors reported by a media channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The requested entity (item, file, or session) does not exist on the
    /// server. For progress sync this triggers a session reopen.
    #[error("Not found")]
    NotFound,

    /// Credentials are missing or rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// The server is unreachable or the request failed in transit
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with something the client cannot interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The channel does not support the requested operation
    #[error("Operation not supported")]
    Unsupported,
}

/// Result type for media channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
