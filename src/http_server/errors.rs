//! # HTTP API Errors
//!
//! Maps store and request failures onto status codes and the failure
//! envelope. Storage faults are logged here and reach the client only as a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::envelope::Envelope;
use crate::store::StoreError;
use crate::student::MalformedKey;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// The store operation a handler was performing, used to word 500 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn failure_message(&self) -> &'static str {
        match self {
            Operation::List => "Error fetching students",
            Operation::Get => "Error fetching student",
            Operation::Create => "Error creating student",
            Operation::Update => "Error updating student",
            Operation::Delete => "Error deleting student",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// One or more field constraints violated
    #[error("Validation error")]
    Validation(Vec<String>),

    /// Id not in the store's key encoding
    #[error("Invalid student ID")]
    MalformedKey(#[from] MalformedKey),

    /// Body is not a JSON object
    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Student not found")]
    NotFound,

    #[error("Route not found")]
    RouteNotFound,

    /// Known path, unsupported method
    #[error("Method not allowed")]
    MethodNotAllowed,

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("{}", .0.failure_message())]
    Internal(Operation),
}

impl ApiError {
    /// Converts a store failure, logging anything that is not the client's fault.
    pub fn from_store(operation: Operation, err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => ApiError::Validation(errors.messages()),
            StoreError::NotFound(_) => ApiError::NotFound,
            other => {
                tracing::error!(?operation, error = %other, "student store failure");
                ApiError::Internal(operation)
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedKey(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> Envelope {
        match self {
            ApiError::Validation(errors) => {
                Envelope::failure_with_errors(self.to_string(), errors.clone())
            }
            _ => Envelope::failure(self.to_string()),
        }
    }
}

/// Router fallback for paths no route matches.
pub(crate) async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Method-router fallback for known paths.
pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InvalidBody(reason) = &self {
            tracing::debug!(%reason, "rejected request body");
        }
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use crate::student::{StudentId, StudentInput};

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MalformedKey("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Internal(Operation::List).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_map_to_kinds() {
        let validation = StudentInput::default().validate().unwrap_err();
        match ApiError::from_store(Operation::Create, validation.into()) {
            ApiError::Validation(messages) => assert_eq!(messages.len(), 4),
            other => panic!("unexpected {other:?}"),
        }

        let not_found = StoreError::NotFound(StudentId::generate());
        assert!(matches!(
            ApiError::from_store(Operation::Get, not_found),
            ApiError::NotFound
        ));
    }

    #[test]
    fn test_storage_failure_is_generic() {
        let storage = StorageError::corruption_at_offset(12, "checksum mismatch");
        let err = ApiError::from_store(Operation::Delete, storage.into());

        assert_eq!(err.to_string(), "Error deleting student");
        let envelope = serde_json::to_value(err.envelope()).unwrap();
        assert!(!envelope.to_string().contains("checksum"));
    }

    #[test]
    fn test_validation_envelope_lists_errors() {
        let err = ApiError::Validation(vec!["Email is required".into()]);
        let envelope = serde_json::to_value(err.envelope()).unwrap();
        assert_eq!(envelope["message"], "Validation error");
        assert_eq!(envelope["errors"][0], "Email is required");
    }
}
