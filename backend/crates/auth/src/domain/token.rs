//! Token Codec
//!
//! Mints and verifies compact signed identity tokens. Pure and
//! stateless: the signing key is always an explicit argument, never
//! read from ambient configuration, so both directions are trivially
//! testable.
//!
//! Wire format: `base64url(claims JSON) . base64url(HMAC-SHA256)`.
//! The MAC is computed over the encoded claims segment.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Token kind discriminator
///
/// Access and refresh tokens are signed with different keys, but the
/// kind is also carried in the claims so a refresh token can never be
/// replayed where an access token is expected (and vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Decoded token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account UUID
    pub sub: Uuid,
    /// Account email at mint time
    pub email: String,
    /// Per-mint random correlation id. Rotation bookkeeping only;
    /// verification never looks at it.
    pub jti: Uuid,
    /// Token kind
    pub kind: TokenKind,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Token verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a parseable token at all
    #[error("Malformed token")]
    Malformed,

    /// Structure is fine but the MAC does not verify
    #[error("Token signature invalid")]
    SignatureInvalid,

    /// Signature verifies but the token is past its expiry
    #[error("Token expired")]
    Expired,
}

/// Mint a signed token for `sub`/`email` with the given kind and TTL
///
/// Every call generates a fresh `jti`, so two tokens minted for the
/// same subject in the same second still differ.
pub fn mint(sub: Uuid, email: &str, kind: TokenKind, key: &[u8; 32], ttl: Duration) -> String {
    let now = Utc::now().timestamp();

    let claims = Claims {
        sub,
        email: email.to_string(),
        jti: Uuid::new_v4(),
        kind,
        iat: now,
        exp: now + ttl.as_secs() as i64,
    };

    let payload = serde_json::to_vec(&claims).expect("claims serialization is infallible");
    let encoded = URL_SAFE_NO_PAD.encode(&payload);

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(encoded.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!("{}.{}", encoded, URL_SAFE_NO_PAD.encode(signature))
}

/// Verify a token's signature and expiry
pub fn verify(token: &str, key: &[u8; 32]) -> Result<Claims, TokenError> {
    verify_inner(token, key, true)
}

/// Verify a token's signature only, ignoring expiry
///
/// Used by the logout path: an expired refresh token still identifies
/// which account's stored token to clear.
pub fn verify_allow_expired(token: &str, key: &[u8; 32]) -> Result<Claims, TokenError> {
    verify_inner(token, key, false)
}

fn verify_inner(token: &str, key: &[u8; 32], check_expiry: bool) -> Result<Claims, TokenError> {
    let (encoded, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;

    if encoded.is_empty() || signature_b64.contains('.') {
        return Err(TokenError::Malformed);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;

    // Signature first: claims from an unverified payload are never parsed
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(encoded.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::SignatureInvalid)?;

    let payload = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

    if check_expiry && claims.exp < Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}
