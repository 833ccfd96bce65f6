//! In-Memory Repository Implementation
//!
//! Backs the test suite and local experimentation. Everything runs
//! under one mutex, so the swap is trivially atomic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{account_id::AccountId, email::Email};
use crate::error::{AuthError, AuthResult};

/// In-memory account repository
///
/// Clones share the same underlying store.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<std::sync::MutexGuard<'_, HashMap<Uuid, Account>>> {
        self.accounts
            .lock()
            .map_err(|_| AuthError::Internal("Account store mutex poisoned".into()))
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.lock()?;

        if accounts
            .values()
            .any(|a| a.email.as_str() == account.email.as_str())
        {
            return Err(AuthError::DuplicateAccount);
        }

        accounts.insert(*account.account_id.as_uuid(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.lock()?.get(account_id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self
            .lock()?
            .values()
            .find(|a| a.email.as_str() == email.as_str())
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self
            .lock()?
            .values()
            .any(|a| a.email.as_str() == email.as_str()))
    }

    async fn set_refresh_token(&self, account_id: &AccountId, token: &str) -> AuthResult<()> {
        let mut accounts = self.lock()?;

        if let Some(account) = accounts.get_mut(account_id.as_uuid()) {
            account.current_refresh_token = Some(token.to_string());
            account.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        account_id: &AccountId,
        current: &str,
        next: &str,
    ) -> AuthResult<bool> {
        let mut accounts = self.lock()?;

        let Some(account) = accounts.get_mut(account_id.as_uuid()) else {
            return Ok(false);
        };

        match account.current_refresh_token.as_deref() {
            Some(stored) if platform::crypto::constant_time_eq(stored.as_bytes(), current.as_bytes()) => {
                account.current_refresh_token = Some(next.to_string());
                account.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, account_id: &AccountId) -> AuthResult<()> {
        let mut accounts = self.lock()?;

        if let Some(account) = accounts.get_mut(account_id.as_uuid()) {
            account.current_refresh_token = None;
            account.updated_at = Utc::now();
        }

        Ok(())
    }
}
