//! Centralized error handling.
//!
//! `AppError` is the closed set of failures the service reports to callers.
//! Storage and cache layers keep their own native errors; the service layer
//! is the only place that translates them into an `AppError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Boxed cause carried by internal errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message rendered for every internal error, whatever the cause.
pub const INTERNAL_MESSAGE: &str = "internal error";

/// Discriminant of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Stable error code for clients
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller-supplied data failed a precondition
    #[error("{0}")]
    InvalidArgument(String),

    /// Referenced identity does not exist
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness or state constraint was violated
    #[error("{0}")]
    Conflict(String),

    /// Anything unanticipated. The cause is for logs only.
    #[error("internal error")]
    Internal(#[source] BoxError),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Stable error code
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    /// Human-readable message
    #[schema(example = "user not found")]
    pub message: String,
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(cause: impl Into<BoxError>) -> Self {
        AppError::Internal(cause.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }

    /// Underlying cause of an internal error.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            AppError::Internal(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

/// Errors compare by kind, never by message text.
impl PartialEq for AppError {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(cause) = &self {
            tracing::error!(error = %cause, "Internal error: {:?}", cause);
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.user_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
