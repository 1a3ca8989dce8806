//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion. This is the single place
//! where persistence failures are translated into status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("Authentication required")]
    Unauthorized,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] DbErr),

    #[error("Session error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Classification of database failures for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DbFailure {
    UniqueViolation,
    ForeignKeyViolation,
    RecordNotFound,
    Unavailable,
    Other,
}

/// SQLSTATE reported when a SERIALIZABLE transaction loses a conflict
const SERIALIZATION_FAILURE: &str = "40001";

fn is_serialization_failure(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Exec(e) | DbErr::Query(e) | DbErr::Conn(e) => e,
        _ => return false,
    };

    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => {
            db.code().as_deref() == Some(SERIALIZATION_FAILURE)
        }
        _ => false,
    }
}

fn classify_db_error(err: &DbErr) -> DbFailure {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => return DbFailure::UniqueViolation,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => return DbFailure::ForeignKeyViolation,
        _ => {}
    }

    match err {
        DbErr::RecordNotFound(_) => DbFailure::RecordNotFound,
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => DbFailure::Unavailable,
        _ => DbFailure::Other,
    }
}

impl AppError {
    /// Get error code for client
    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::NotFound => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(e) => match classify_db_error(e) {
                DbFailure::UniqueViolation => "CONFLICT",
                DbFailure::ForeignKeyViolation => "INVALID_REFERENCE",
                DbFailure::RecordNotFound => "NOT_FOUND",
                DbFailure::Unavailable => "SERVICE_UNAVAILABLE",
                DbFailure::Other => "DATABASE_ERROR",
            },
            AppError::Jwt(_) => "UNAUTHORIZED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(e) => match classify_db_error(e) {
                DbFailure::UniqueViolation => StatusCode::CONFLICT,
                DbFailure::ForeignKeyViolation => StatusCode::BAD_REQUEST,
                DbFailure::RecordNotFound => StatusCode::NOT_FOUND,
                DbFailure::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                DbFailure::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),

            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                match classify_db_error(e) {
                    DbFailure::UniqueViolation => "Resource already exists".to_string(),
                    DbFailure::ForeignKeyViolation => "Referenced resource does not exist".to_string(),
                    DbFailure::RecordNotFound => "Resource not found".to_string(),
                    DbFailure::Unavailable => "Database temporarily unavailable".to_string(),
                    DbFailure::Other => "A database error occurred".to_string(),
                }
            }
            AppError::Jwt(e) => {
                tracing::debug!("Session token rejected: {:?}", e);
                "Invalid or expired session".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

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
    /// Whether a concurrent transaction won a serialization conflict.
    /// Re-running the transaction may succeed.
    pub fn is_serialization_failure(&self) -> bool {
        match self {
            AppError::Database(e) => is_serialization_failure(e),
            _ => false,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// A database error carrying SQLSTATE 40001, as Postgres reports it.
#[cfg(test)]
pub(crate) fn serialization_conflict() -> AppError {
    use std::borrow::Cow;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    struct SerializationConflict;

    impl fmt::Display for SerializationConflict {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("could not serialize access due to read/write dependencies among transactions")
        }
    }

    impl std::error::Error for SerializationConflict {}

    impl DatabaseError for SerializationConflict {
        fn message(&self) -> &str {
            "could not serialize access due to read/write dependencies among transactions"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(SERIALIZATION_FAILURE))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    AppError::Database(DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(
        Box::new(SerializationConflict),
    ))))
}
