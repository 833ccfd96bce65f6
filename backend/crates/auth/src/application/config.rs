//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
///
/// Access and refresh tokens are signed with separate keys, so
/// neither can be replayed in the other's role even if the kind
/// claim were stripped.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Key for access-token HMAC signing (32 bytes)
    pub access_secret: [u8; 32],
    /// Key for refresh-token HMAC signing (32 bytes)
    pub refresh_secret: [u8; 32],
    /// Access token TTL (1 hour)
    pub access_ttl: Duration,
    /// Refresh token TTL (7 days)
    pub refresh_ttl: Duration,
    /// Refresh cookie name
    pub refresh_cookie_name: String,
    /// Refresh cookie path; scoped so the browser only sends the
    /// cookie to the auth endpoints
    pub refresh_cookie_path: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: [0u8; 32],
            refresh_secret: [0u8; 32],
            access_ttl: Duration::from_secs(3600),            // 1 hour
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),  // 7 days
            refresh_cookie_name: "refresh_token".to_string(),
            refresh_cookie_path: "/api/auth".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl AuthConfig {
    /// Create config with random signing keys (for development)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut access_secret = [0u8; 32];
        let mut refresh_secret = [0u8; 32];
        rand::rng().fill_bytes(&mut access_secret);
        rand::rng().fill_bytes(&mut refresh_secret);
        Self {
            access_secret,
            refresh_secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    /// Cookie configuration for setting the refresh cookie
    pub fn refresh_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.refresh_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: self.refresh_cookie_path.clone(),
            max_age_secs: Some(self.refresh_ttl.as_secs() as i64),
        }
    }
}
