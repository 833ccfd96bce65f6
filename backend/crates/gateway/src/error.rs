//! Gateway Error Types

use thiserror::Error;

/// Gateway-specific result type alias
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the client gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Login rejected by the server
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The session could not be recovered; the caller must sign in
    /// again
    #[error("Session expired")]
    SessionExpired,

    /// A refresh led by another request did not finish in time
    #[error("Token refresh timed out")]
    RefreshTimeout,

    /// Non-auth API failure, with the server's problem detail
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}
