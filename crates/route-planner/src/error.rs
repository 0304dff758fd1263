//! Error types for route-planner.

use thiserror::Error;

/// Errors raised inside a routing provider.
///
/// These never leave [`crate::RoutingProvider::get_routes`]; a failing
/// provider answers with an empty list instead.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("provider returned status {0}")]
    Status(u16),

    /// Provider answered with an unusable route.
    #[error("malformed route: {0}")]
    Malformed(String),
}

/// Result type for provider internals.
pub type Result<T> = std::result::Result<T, RoutingError>;
