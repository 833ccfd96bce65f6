//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterUseCase};

use crate::domain::entity::account::Identity;

/// Result of a successful login or rotation: the freshly minted
/// token pair plus the identity they certify.
///
/// The refresh token only ever travels in the http-only cookie; the
/// access token goes to the caller in-body.
#[derive(Debug)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub identity: Identity,
}
