//! Unified error handling.
//!
//! One error type for the whole workspace, converted into an HTTP response
//! at the axum boundary. Backend-specific variants are feature gated.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    /// A filter-driven mutation was refused before reaching the store
    #[error("Refused: {0}")]
    Guard(String),

    // Upload pipeline
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("No files submitted")]
    NoFilesSubmitted,

    #[error("Storage error")]
    Storage(#[from] std::io::Error),

    // Backends
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[cfg(feature = "database")]
    #[error("Transaction error")]
    Transaction(sea_orm::DbErr),

    #[cfg(feature = "document")]
    #[error("Document store error")]
    Document(#[from] mongodb::error::Error),

    #[cfg(feature = "document")]
    #[error("Document decode error")]
    Decode(#[from] mongodb::bson::de::Error),

    #[cfg(feature = "jwt")]
    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Service unavailable")]
    ServiceUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Guard(_) => "PRECONDITION_FAILED",
            AppError::UploadRejected(_) => "UPLOAD_REJECTED",
            AppError::NoFilesSubmitted => "NO_FILES_SUBMITTED",
            AppError::Storage(_) => "STORAGE_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            #[cfg(feature = "database")]
            AppError::Transaction(_) => "TRANSACTION_ERROR",
            #[cfg(feature = "document")]
            AppError::Document(_) => "DOCUMENT_STORE_ERROR",
            #[cfg(feature = "document")]
            AppError::Decode(_) => "DOCUMENT_DECODE_ERROR",
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::UploadRejected(_)
            | AppError::NoFilesSubmitted => StatusCode::BAD_REQUEST,
            AppError::Guard(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Guard(msg) => msg.clone(),
            AppError::UploadRejected(msg) => msg.clone(),

            // Hide details for internal/security errors
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                "Failed to store file".to_string()
            }
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            #[cfg(feature = "database")]
            AppError::Transaction(e) => {
                tracing::error!("Transaction error: {:?}", e);
                "A database error occurred".to_string()
            }
            #[cfg(feature = "document")]
            AppError::Document(e) => {
                tracing::error!("Document store error: {:?}", e);
                "A document store error occurred".to_string()
            }
            #[cfg(feature = "document")]
            AppError::Decode(e) => {
                tracing::error!("Document decode error: {:?}", e);
                "A document store error occurred".to_string()
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => {
                tracing::warn!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::ServiceUnavailable(service) => {
                tracing::error!("Service unavailable: {}", service);
                format!("Service {} is unavailable", service)
            }
            AppError::Config(msg) | AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::NotFound(_) => AppError::NotFound,
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn guard(msg: impl Into<String>) -> Self {
        AppError::Guard(msg.into())
    }

    pub fn upload_rejected(msg: impl Into<String>) -> Self {
        AppError::UploadRejected(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(service.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_maps_to_unprocessable() {
        let err = AppError::guard("empty filter");
        assert_eq!(err.code(), "PRECONDITION_FAILED");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.user_message(), "empty filter");
    }

    #[test]
    fn test_upload_errors_are_client_errors() {
        assert_eq!(
            AppError::upload_rejected("a.exe").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NoFilesSubmitted.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoFilesSubmitted.code(), "NO_FILES_SUBMITTED");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::internal("connection string leaked");
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_storage_error_from_io() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(err.code(), "STORAGE_ERROR");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: AppError = DomainError::conflict("Branch CBG001").into();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.user_message(), "Branch CBG001 already exists");

        let err: AppError = DomainError::not_found("branch").into();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn test_ok_or_not_found() {
        let none: Option<u8> = None;
        assert!(matches!(none.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
