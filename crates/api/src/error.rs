//! Error types for the core HTTP API.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orchestrator::OrchestratorError;
use serde_json::Value;
use thiserror::Error;
use trip_core::{ErrorBody, FieldErrors};

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed schema or range checks.
    #[error("validation failed")]
    Validation(Value),

    /// Unknown trip or user.
    #[error("{0}")]
    NotFound(String),

    /// Rejected by the trip state machine.
    #[error("{0}")]
    InvalidState(String),

    /// Missing or wrong request signature.
    #[error("{0}")]
    Unauthenticated(String),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable error kind for the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::NotFound(_) => "not_found",
            ApiError::InvalidState(_) => "invalid_state",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut details = serde_json::Map::new();
        details.insert(field.to_string(), Value::String(message.into()));
        ApiError::Validation(Value::Object(details))
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(serde_json::to_value(&errors).unwrap_or_default())
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Validation(errors) => errors.into(),
            OrchestratorError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            OrchestratorError::InvalidState { .. } => ApiError::InvalidState(err.to_string()),
            OrchestratorError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_field("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_field("id", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(details) => ErrorBody::new("validation_failed")
                .with_message("Request validation failed")
                .with_details(details),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                ErrorBody::new("internal_error").with_message("Internal server error")
            }
            other => {
                let kind = other.kind();
                ErrorBody::new(kind).with_message(other.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use trip_core::TripStatus;

    #[test]
    fn test_orchestrator_mapping() {
        let err: ApiError = OrchestratorError::InvalidState {
            trip_id: 7,
            status: TripStatus::Completed,
            action: "record location for",
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "invalid_state");
        assert!(err.to_string().contains("COMPLETED"));

        let err: ApiError = OrchestratorError::NotFound {
            entity: "Trip",
            id: "7".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let mut fields = FieldErrors::new();
        fields.insert("phone", "must be a valid international number");
        let err: ApiError = OrchestratorError::Validation(fields).into();
        match err {
            ApiError::Validation(details) => {
                assert_eq!(details["phone"], "must be a valid international number");
            }
            other => panic!("expected validation, got {:?}", other),
        }
    }
}
