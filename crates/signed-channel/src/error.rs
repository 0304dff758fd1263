//! Error types for signed-channel.

use thiserror::Error;

/// Errors raised while signing, verifying or sending signed requests.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Peer answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Request carried no signature header.
    #[error("missing signature")]
    MissingSignature,

    /// Signature is not hex, has the wrong length, or does not match.
    #[error("invalid signature")]
    InvalidSignature,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for signed-channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
