//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{account_id::AccountId, email::Email};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed account repository
///
/// `swap_refresh_token` is a conditional UPDATE, so the rotation CAS
/// is atomic at the database level regardless of how many API
/// instances share the pool.
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                email,
                name,
                password_hash,
                refresh_token,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.name.as_deref())
        .bind(account.password_hash.as_phc_string())
        .bind(account.current_refresh_token.as_deref())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                name,
                password_hash,
                refresh_token,
                created_at,
                updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                name,
                password_hash,
                refresh_token,
                created_at,
                updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn set_refresh_token(&self, account_id: &AccountId, token: &str) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = $2, updated_at = $3
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        account_id: &AccountId,
        current: &str,
        next: &str,
    ) -> AuthResult<bool> {
        // The WHERE clause is the compare half of the CAS; of two
        // concurrent rotations only one UPDATE matches a row.
        let rows = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = $3, updated_at = $4
            WHERE account_id = $1 AND refresh_token = $2
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(current)
        .bind(next)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows == 1)
    }

    async fn clear_refresh_token(&self, account_id: &AccountId) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = NULL, updated_at = $2
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    name: Option<String>,
    password_hash: String,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Corrupt password hash: {e}")))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            email: Email::from_db(self.email),
            name: self.name,
            password_hash,
            current_refresh_token: self.refresh_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
