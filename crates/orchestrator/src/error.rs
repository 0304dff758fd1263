//! Error types for orchestrator operations.

use database::DatabaseError;
use thiserror::Error;
use trip_core::{FieldErrors, TripStatus};

/// Errors that can occur while driving a trip.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Request failed field validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Unknown trip or user.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The trip's current state does not allow the requested action.
    #[error("cannot {action} trip {trip_id} in status {status}")]
    InvalidState {
        trip_id: i64,
        status: TripStatus,
        action: &'static str,
    },

    /// Persistence failed.
    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for OrchestratorError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => OrchestratorError::NotFound { entity, id },
            other => OrchestratorError::Database(other),
        }
    }
}

impl From<FieldErrors> for OrchestratorError {
    fn from(errors: FieldErrors) -> Self {
        OrchestratorError::Validation(errors)
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
