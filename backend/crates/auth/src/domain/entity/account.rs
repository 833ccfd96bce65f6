//! Account Entity
//!
//! A registered account: the login identity plus the single slot for
//! the currently valid refresh token.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_object::{account_id::AccountId, email::Email};

/// Account entity
///
/// `current_refresh_token` holds at most one value; every login or
/// rotation overwrites it, which is what invalidates all earlier
/// refresh tokens for the account.
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier
    pub account_id: AccountId,
    /// Unique login email
    pub email: Email,
    /// Optional display name
    pub name: Option<String>,
    /// Argon2id hash in PHC format
    pub password_hash: HashedPassword,
    /// The one currently valid refresh token, if any
    pub current_refresh_token: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account
    pub fn new(email: Email, name: Option<String>, password_hash: HashedPassword) -> Self {
        let now = Utc::now();

        Self {
            account_id: AccountId::new(),
            email,
            name,
            password_hash,
            current_refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public identity view of this account (never includes the hash)
    pub fn identity(&self) -> Identity {
        Identity {
            id: *self.account_id.as_uuid(),
            email: self.email.as_str().to_string(),
            name: self.name.clone(),
        }
    }
}

/// Identity attached to tokens and returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}
