//! Error types for the bot gateway.

use signed_channel::ChannelError;
use thiserror::Error;
use trip_core::ErrorBody;

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Signing, transport or JSON failure.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Core answered with its error body.
    #[error("core returned {status}: {}", .body.error)]
    Core { status: u16, body: ErrorBody },

    /// Core answered with something other than JSON.
    #[error("unexpected core response {status}: {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// Chat delivery failed.
    #[error("send failed: {0}")]
    Send(String),
}

impl GatewayError {
    /// Core error kind, when Core produced one.
    pub fn core_kind(&self) -> Option<&str> {
        match self {
            GatewayError::Core { body, .. } => Some(body.error.as_str()),
            _ => None,
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
