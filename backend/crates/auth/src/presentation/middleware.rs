//! Auth Middleware
//!
//! Middleware for requiring a valid access token on protected routes.

use axum::body::Body;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::token::{self, TokenKind};
use crate::domain::value_object::account_id::AccountId;
use crate::error::AuthError;

/// Middleware state
///
/// Access-token checks are stateless, so no repository is needed here.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub config: Arc<AuthConfig>,
}

/// Identity extracted from a verified access token, stored in request
/// extensions for downstream handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: AccountId,
    pub email: String,
}

/// Middleware that requires a valid bearer access token
pub async fn require_access_token(
    state: AuthMiddlewareState,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(req.headers())
        .ok_or_else(|| AuthError::MissingToken.into_response())?;

    let claims = token::verify(token, &state.config.access_secret)
        .map_err(|e| AuthError::from_access_token(e).into_response())?;

    // A refresh token must never open a protected route
    if claims.kind != TokenKind::Access {
        return Err(AuthError::InvalidSignatureToken.into_response());
    }

    req.extensions_mut().insert(AuthenticatedUser {
        account_id: AccountId::from_uuid(claims.sub),
        email: claims.email,
    });

    Ok(next.run(req).await)
}

fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
