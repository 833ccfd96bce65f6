//! Register Use Case
//!
//! Creates a new account.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::domain::entity::account::{Account, Identity};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<Identity> {
        let email =
            Email::new(&input.email).map_err(|e| AuthError::Validation(e.message().to_string()))?;

        let password = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let account = Account::new(email, input.name, password_hash);
        self.repo.create(&account).await?;

        tracing::info!(
            account_id = %account.account_id,
            "Account registered"
        );

        Ok(account.identity())
    }
}
