//! # API Error Types
//!
//! Every handler returns `Result<_, ApiError>`; the error renders itself as
//! a JSON body with the matching status code.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Source                        ApiError              HTTP            │
//! │  ─────────────────────────     ──────────────────    ─────────────── │
//! │  service returned None/false   not_found("Cliente")  404             │
//! │  ValidationError               validation(..)        400             │
//! │  unreadable JSON / query       bad_request(..)       400             │
//! │  ServiceError (store, decode)  operation(..)         500 + error!    │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Body: `{"code": "NOT_FOUND", "message": "Cliente not found"}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use ventas_core::{CoreError, ValidationError};
use ventas_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Failure inside a resource service.
///
/// Absent documents and malformed ids are not errors; services report them
/// as `None`/`false`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Store driver failure.
    #[error(transparent)]
    Store(#[from] DbError),

    /// A stored document could not be read or written.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// Error code for client handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    BadRequest,
    DatabaseError,
    InternalError,
}

/// Error returned to HTTP clients.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    /// `"<resource> not found"`, 404.
    pub fn not_found(resource: &str) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            code: ErrorCode::NotFound,
            message: format!("{resource} not found"),
        }
    }

    pub fn validation(err: ValidationError) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::ValidationError,
            message: err.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::BadRequest,
            message: message.into(),
        }
    }

    /// Server fault while performing `operation` (e.g. "fetching cliente").
    pub fn operation(operation: &str, source: ServiceError) -> Self {
        tracing::error!(operation, error = %source, "Service operation failed");

        let code = match &source {
            ServiceError::Store(_) => ErrorCode::DatabaseError,
            ServiceError::Core(_) => ErrorCode::InternalError,
        };

        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code,
            message: format!("Error {operation}: {source}"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Attaches an operation name to a service failure.
///
/// ```rust,ignore
/// let cliente = service.get(&id).await.during("fetching cliente")?;
/// ```
pub trait OperationContext<T> {
    fn during(self, operation: &str) -> Result<T, ApiError>;
}

impl<T> OperationContext<T> for ServiceResult<T> {
    fn during(self, operation: &str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::operation(operation, source))
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found("Orden");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Orden not found");
    }

    #[test]
    fn test_operation_message_carries_cause() {
        let source = ServiceError::Store(DbError::QueryFailed("disk I/O error".into()));
        let result: ServiceResult<()> = Err(source);
        let err = result.during("creating orden").unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.starts_with("Error creating orden: "));
        assert!(err.message.contains("disk I/O error"));
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err: ApiError = ValidationError::required("nombre").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(ApiError::not_found("Cliente")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"code": "NOT_FOUND", "message": "Cliente not found"})
        );
    }
}
