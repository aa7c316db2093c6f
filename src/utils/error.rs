//! Error Handling Utilities
//!
//! Error types and HTTP mapping for the biodata service.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{
        BytesRejection, JsonRejection, PathRejection, QueryRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::database::StoreError;
use crate::service::{IdentityError, ImageStoreError};

/// Main application error type that can represent errors from any feature
#[derive(Error, Debug)]
pub enum AppError {
    /// Profile store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid bearer token
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Body, query string or path that could not be extracted
    #[error("{message}: {details}")]
    MalformedRequest {
        message: &'static str,
        details: String,
    },

    /// Authenticated caller lacks the required access
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g., duplicate accounts, repeated contact requests)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Duplicate submissions reported as bad requests (favourites, biodata)
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Generic internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Standard error response structure for API endpoints
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(error: &str, message: &str, details: serde_json::Value) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: Some(details),
        }
    }
}

impl AppError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::MalformedRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Duplicate(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            AppError::Store(e) => {
                log::error!("Profile store failure: {}", e);
                ErrorResponse::with_details(
                    "DATABASE_ERROR",
                    "A database error occurred",
                    serde_json::Value::String(e.to_string()),
                )
            }
            AppError::Validation(msg) => ErrorResponse::new("VALIDATION_ERROR", &msg),
            AppError::MalformedRequest { message, details } => ErrorResponse::with_details(
                "VALIDATION_ERROR",
                message,
                serde_json::Value::String(details),
            ),
            AppError::Authentication(msg) => ErrorResponse::new("AUTHENTICATION_ERROR", &msg),
            AppError::Forbidden(msg) => ErrorResponse::new("FORBIDDEN", &msg),
            AppError::NotFound(msg) => ErrorResponse::new("NOT_FOUND", &msg),
            AppError::Conflict(msg) | AppError::Duplicate(msg) => {
                ErrorResponse::new("CONFLICT", &msg)
            }
            AppError::ExternalService(msg) => {
                log::error!("External service failure: {}", msg);
                ErrorResponse::with_details(
                    "EXTERNAL_SERVICE_ERROR",
                    "External service unavailable",
                    serde_json::Value::String(msg),
                )
            }
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        AppError::Authentication(err.to_string())
    }
}

impl From<ImageStoreError> for AppError {
    fn from(err: ImageStoreError) -> Self {
        match err {
            ImageStoreError::Rejected(msg) => AppError::Validation(msg),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedRequest {
            message: "Invalid JSON body",
            details: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedRequest {
            message: "Invalid query string",
            details: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::MalformedRequest {
            message: "Invalid path parameter",
            details: rejection.body_text(),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::MalformedRequest {
            message: "Unreadable request body",
            details: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::MalformedRequest {
            message: "Invalid multipart body",
            details: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::MalformedRequest {
            message: "Invalid multipart body",
            details: err.body_text(),
        }
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

/// Helper trait for converting other error types to AppError
pub trait IntoAppError<T> {
    fn into_app_error(self, context: &str) -> AppResult<T>;
}

impl<T, E> IntoAppError<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn into_app_error(self, context: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Internal(format!("{}: {}", context, e)))
    }
}
