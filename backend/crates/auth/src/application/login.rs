//! Login Use Case
//!
//! Verifies credentials and issues the access/refresh token pair.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::IssuedSession;
use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::domain::token::{self, TokenKind};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
///
/// Every failure before the hash check collapses into
/// `InvalidCredentials` so an attacker cannot tell a missing account
/// from a wrong password.
pub struct LoginUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<IssuedSession> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Argon2 verification, constant-time by construction
        if !account.password_hash.verify(&password) {
            return Err(AuthError::InvalidCredentials);
        }

        let sub = *account.account_id.as_uuid();
        let access_token = token::mint(
            sub,
            account.email.as_str(),
            TokenKind::Access,
            &self.config.access_secret,
            self.config.access_ttl,
        );
        let refresh_token = token::mint(
            sub,
            account.email.as_str(),
            TokenKind::Refresh,
            &self.config.refresh_secret,
            self.config.refresh_ttl,
        );

        // Overwrite unconditionally: a new login ends every other
        // session for this account.
        self.repo
            .set_refresh_token(&account.account_id, &refresh_token)
            .await?;

        tracing::info!(
            account_id = %account.account_id,
            "Login succeeded, refresh token rotated in"
        );

        Ok(IssuedSession {
            access_token,
            refresh_token,
            identity: account.identity(),
        })
    }
}
