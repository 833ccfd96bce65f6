//! Refresh Use Case
//!
//! Validates a presented refresh token against the stored value and
//! rotates it: Presented -> {Rejected, Rotated}.

use std::sync::Arc;

use crate::application::IssuedSession;
use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::domain::token::{self, TokenKind};
use crate::domain::value_object::account_id::AccountId;
use crate::error::{AuthError, AuthResult};

/// Refresh use case
///
/// Rotation is a compare-and-swap against the stored value: of two
/// concurrent refreshes presenting the same token, exactly one wins.
/// A CAS miss means the presented token was already superseded; the
/// account's stored token is then cleared outright, since replaying a
/// rotated token is the signature of token theft.
pub struct RefreshUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RefreshUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, presented: Option<&str>) -> AuthResult<IssuedSession> {
        let presented = presented.ok_or(AuthError::MissingToken)?;

        let claims = token::verify(presented, &self.config.refresh_secret)
            .map_err(AuthError::from_refresh_token)?;

        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::InvalidSignatureToken);
        }

        let account_id = AccountId::from_uuid(claims.sub);
        let account = self
            .repo
            .find_by_id(&account_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let sub = *account.account_id.as_uuid();
        let access_token = token::mint(
            sub,
            account.email.as_str(),
            TokenKind::Access,
            &self.config.access_secret,
            self.config.access_ttl,
        );
        let next_refresh = token::mint(
            sub,
            account.email.as_str(),
            TokenKind::Refresh,
            &self.config.refresh_secret,
            self.config.refresh_ttl,
        );

        let rotated = self
            .repo
            .swap_refresh_token(&account_id, presented, &next_refresh)
            .await?;

        if !rotated {
            // Already rotated: the presented value is permanently dead.
            // Clear the slot so the stolen-or-raced session family ends here.
            self.repo.clear_refresh_token(&account_id).await?;
            return Err(AuthError::RotatedTokenReuse);
        }

        tracing::debug!(
            account_id = %account_id,
            jti = %claims.jti,
            "Refresh token rotated"
        );

        Ok(IssuedSession {
            access_token,
            refresh_token: next_refresh,
            identity: account.identity(),
        })
    }
}
