//! Logout Use Case
//!
//! Clears the stored refresh token. Idempotent: logging out twice,
//! or with no token at all, is still a success.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::domain::token;
use crate::domain::value_object::account_id::AccountId;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> LogoutUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Clear the stored token for whichever account the cookie names.
    ///
    /// Expiry is ignored: an expired refresh token still identifies
    /// the slot to clear. A token that fails signature verification
    /// identifies nothing and is dropped silently.
    pub async fn execute(&self, presented: Option<&str>) -> AuthResult<()> {
        let Some(presented) = presented else {
            return Ok(());
        };

        let Ok(claims) = token::verify_allow_expired(presented, &self.config.refresh_secret) else {
            return Ok(());
        };

        let account_id = AccountId::from_uuid(claims.sub);
        self.repo.clear_refresh_token(&account_id).await?;

        tracing::info!(account_id = %account_id, "Logged out");
        Ok(())
    }
}
