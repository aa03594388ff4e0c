//! Error types for the client management API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use siteforge_provisioning::ProvisionError;
use siteforge_store::StoreError;

/// Errors surfaced by the client management handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request input failed validation; carries every violated field.
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    /// Client not found.
    #[error("Client {0} not found")]
    ClientNotFound(Uuid),

    /// Domain already in use or another run holds it.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The client's current status does not allow the operation.
    #[error("Invalid status transition: {0}")]
    InvalidState(String),

    /// Provisioning pipeline failed on a critical step.
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    /// Database or storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One violated request field.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Request field name.
    pub field: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Error response format for API errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldViolation>>,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ClientNotFound(id) => ApiError::ClientNotFound(id),
            StoreError::DuplicateDomain(domain) => {
                ApiError::Conflict(format!("Domain already in use: {domain}"))
            }
            StoreError::InvalidTransition { from, to } => {
                ApiError::InvalidState(format!("cannot move client from '{from}' to '{to}'"))
            }
            StoreError::Database(err) => ApiError::Storage(err.to_string()),
        }
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Validation(errors) => ApiError::Validation(
                errors
                    .into_iter()
                    .map(|e| FieldViolation {
                        field: e.field,
                        reason: e.reason,
                    })
                    .collect(),
            ),
            ProvisionError::Conflict(domain) => {
                ApiError::Conflict(format!("Domain already provisioning: {domain}"))
            }
            ProvisionError::ClientNotFound(id) => ApiError::ClientNotFound(id),
            ProvisionError::Store(err) => ApiError::from(err),
            other => ApiError::Provisioning(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, fields) = match self {
            ApiError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(violations),
            ),
            ApiError::ClientNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Client {id} not found"),
                None,
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::InvalidState(msg) => (StatusCode::CONFLICT, "invalid_state", msg, None),
            ApiError::Provisioning(msg) => {
                tracing::error!("provisioning failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "provisioning_failed",
                    msg,
                    None,
                )
            }
            ApiError::Storage(msg) => {
                tracing::error!("storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
            fields,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_client_not_found() {
        let id = Uuid::new_v4();
        let err = ApiError::from(StoreError::ClientNotFound(id));
        assert!(matches!(err, ApiError::ClientNotFound(got) if got == id));
    }

    #[test]
    fn test_validation_response_is_400() {
        let err = ApiError::Validation(vec![FieldViolation {
            field: "domain".to_string(),
            reason: "is required".to_string(),
        }]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflict_response_is_409() {
        let response = ApiError::Conflict("taken".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_error_hides_detail() {
        let err = ApiError::Storage("connection refused on 10.0.0.3".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
