//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Write rejected because the record is in a terminal state
    #[error("{entity} is no longer mutable: {id}")]
    Immutable { entity: &'static str, id: String },

    /// Stored value could not be decoded
    #[error("corrupt {entity} row: {detail}")]
    Corrupt { entity: &'static str, detail: String },
}

impl DatabaseError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn corrupt(entity: &'static str, detail: impl ToString) -> Self {
        DatabaseError::Corrupt {
            entity,
            detail: detail.to_string(),
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
