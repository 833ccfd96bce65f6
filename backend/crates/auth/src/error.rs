//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Request payload failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No token where one was required
    #[error("Token missing")]
    MissingToken,

    /// Token malformed or carrying a bad signature
    #[error("Token invalid")]
    InvalidSignatureToken,

    /// Token signature fine but past expiry
    #[error("Token expired")]
    ExpiredToken,

    /// Refresh token no longer matches the stored value (already
    /// rotated or deliberately replayed)
    #[error("Refresh token already used")]
    RotatedTokenReuse,

    /// Email already registered
    #[error("An account with this email already exists")]
    DuplicateAccount,

    /// Generic authorization failure
    #[error("Unauthorized")]
    Unauthorized,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidSignatureToken
            | AuthError::ExpiredToken
            | AuthError::RotatedTokenReuse
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateAccount => StatusCode::CONFLICT,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidSignatureToken
            | AuthError::ExpiredToken
            | AuthError::RotatedTokenReuse
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::DuplicateAccount => ErrorKind::Conflict,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Map a codec failure on an access token
    pub fn from_access_token(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Malformed | TokenError::SignatureInvalid => AuthError::InvalidSignatureToken,
        }
    }

    /// Map a codec failure on a refresh token
    pub fn from_refresh_token(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Malformed | TokenError::SignatureInvalid => AuthError::InvalidSignatureToken,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RotatedTokenReuse => {
                tracing::warn!("Superseded refresh token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
