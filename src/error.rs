/// Application error handling
///
/// All fallible operations in this crate return `Result<_, AppError>`;
/// callers match on the error kind rather than on exception identity.
/// The `ResponseError` impl at the bottom maps each kind to an HTTP status.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication and session errors
///
/// `InvalidCredentials` deliberately covers both "unknown email" and "wrong
/// password" so responses never reveal whether an account exists.
/// `InvalidToken` likewise collapses every signature, shape, and expiry
/// failure into a single kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// Malformed, unsigned, or expired token.
    InvalidToken,
    /// No refresh-token hash stored for the subject.
    NoRefreshSession,
    /// Stored refresh-token hash does not match the presented token.
    RefreshMismatch,
    /// Missing or invalid access token on a protected route.
    MissingToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::InvalidToken => write!(f, "Invalid or expired token"),
            AuthError::NoRefreshSession => write!(f, "No refresh session stored"),
            AuthError::RefreshMismatch => write!(f, "Refresh token mismatch"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
        }
    }
}

impl StdError for AuthError {}

/// Central error type for the application
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    /// A record was absent where presence was expected.
    NotFound(String),
    /// Unique-constraint violation, currently only on the email column.
    Duplicate(String),
    Database(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Duplicate(what) => write!(f, "Duplicate entry: {}", what),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("duplicate key") || msg.contains("unique constraint") {
            AppError::Duplicate("email already registered".to_string())
        } else if matches!(err, sqlx::Error::RowNotFound) {
            AppError::NotFound("record".to_string())
        } else {
            AppError::Database(msg)
        }
    }
}

/// Error body returned to HTTP clients
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Auth(AuthError::InvalidCredentials) => "INVALID_CREDENTIALS",
            AppError::Auth(AuthError::InvalidToken) => "TOKEN_INVALID",
            AppError::Auth(AuthError::NoRefreshSession) => "NO_REFRESH_SESSION",
            AppError::Auth(AuthError::RefreshMismatch) => "REFRESH_MISMATCH",
            AppError::Auth(AuthError::MissingToken) => "MISSING_TOKEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Duplicate(_) => "DUPLICATE_ENTRY",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => tracing::warn!(error = %e, "Validation error"),
            AppError::Auth(e) => tracing::warn!(error = %e, "Authentication error"),
            AppError::NotFound(e) => tracing::warn!(error = %e, "Record not found"),
            AppError::Duplicate(e) => tracing::warn!(error = %e, "Duplicate entry attempt"),
            AppError::Database(e) => tracing::error!(error = %e, "Database error"),
            AppError::Internal(e) => tracing::error!(error = %e, "Internal error"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(e) => match e {
                AuthError::NoRefreshSession | AuthError::RefreshMismatch => StatusCode::FORBIDDEN,
                _ => StatusCode::UNAUTHORIZED,
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        let status = self.status_code();
        // Server-side failure detail stays in the logs, not in the body.
        let message = match self {
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            message,
            code: self.code().to_string(),
            status: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}
