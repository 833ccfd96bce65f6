//! Client Session State
//!
//! Holds the in-memory access token and the current authentication
//! state. The refresh token never appears here; it lives in the HTTP
//! client's cookie jar and only the server reads it.

use std::sync::RwLock;

use serde::Deserialize;
use tokio::sync::watch;
use uuid::Uuid;

/// Identity of the signed-in user as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Authentication state, observable through [`Session::subscribe`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated(Identity),
}

/// Shared session state
///
/// Token reads and writes never hold the lock across an await, so a
/// std `RwLock` is enough.
pub struct Session {
    access_token: RwLock<Option<String>>,
    state: watch::Sender<AuthState>,
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);

        Self {
            access_token: RwLock::new(None),
            state,
        }
    }

    /// Watch authentication state changes (UI redirects hang off this)
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Current access token, if any
    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Current authentication state
    pub fn auth_state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state(), AuthState::Authenticated(_))
    }

    /// Install a new token and identity (login, successful refresh)
    pub fn establish(&self, access_token: String, identity: Identity) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = Some(access_token);
        }
        self.state.send_replace(AuthState::Authenticated(identity));
    }

    /// Replace only the access token, keeping the identity
    pub fn replace_access_token(&self, access_token: String) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = Some(access_token);
        }
    }

    /// Drop all session state (logout, unrecoverable refresh failure)
    pub fn clear(&self) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = None;
        }
        self.state.send_replace(AuthState::Unauthenticated);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
