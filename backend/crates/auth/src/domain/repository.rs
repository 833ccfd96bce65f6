//! Repository Trait
//!
//! Interface for account persistence, including the per-account
//! refresh-token slot. Implementations live in the infrastructure
//! layer.
//!
//! Rotation safety depends on `swap_refresh_token` being an atomic
//! compare-and-swap: two concurrent rotations presenting the same
//! stale token must not both succeed.

use crate::domain::entity::account::Account;
use crate::domain::value_object::{account_id::AccountId, email::Email};
use crate::error::AuthResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Create a new account
    async fn create(&self, account: &Account) -> AuthResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Find account by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Unconditionally overwrite the stored refresh token (login)
    async fn set_refresh_token(&self, account_id: &AccountId, token: &str) -> AuthResult<()>;

    /// Atomically replace `current` with `next` (rotation)
    ///
    /// Returns `false` when the stored value no longer equals
    /// `current`; the caller must treat that as reuse of a superseded
    /// token.
    async fn swap_refresh_token(
        &self,
        account_id: &AccountId,
        current: &str,
        next: &str,
    ) -> AuthResult<bool>;

    /// Clear the stored refresh token (logout, reuse detection)
    async fn clear_refresh_token(&self, account_id: &AccountId) -> AuthResult<()>;
}
