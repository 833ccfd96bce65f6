//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AuthResponse, LoginRequest, MeResponse, RegisterRequest, RegisterResponse,
};
use crate::presentation::middleware::AuthenticatedUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/users
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone());

    let input = RegisterInput {
        email: req.email,
        name: req.name,
        password: req.password,
    };

    let identity = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user: identity })))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let session = use_case.execute(input).await?;

    let cookie = state
        .config
        .refresh_cookie()
        .build_set_cookie(&session.refresh_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            access_token: session.access_token,
            user: session.identity,
        }),
    ))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
///
/// Every failure clears the refresh cookie: whatever the browser was
/// holding is dead, and leaving it in place would only produce the
/// same 401 again.
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let presented = extract_refresh_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = RefreshUseCase::new(state.repo.clone(), state.config.clone());

    match use_case.execute(presented.as_deref()).await {
        Ok(session) => {
            let cookie = state
                .config
                .refresh_cookie()
                .build_set_cookie(&session.refresh_token);

            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(AuthResponse {
                    access_token: session.access_token,
                    user: session.identity,
                }),
            )
                .into_response()
        }
        Err(e) => {
            let clear = platform::cookie::delete_cookie_header(&state.config.refresh_cookie());
            let mut response = e.into_response();
            response.headers_mut().append(header::SET_COOKIE, clear);
            response
        }
    }
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Always 204 with a cleared cookie, whatever the cookie held.
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let presented = extract_refresh_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());
    // Ignore errors - just clear the cookie
    let _ = use_case.execute(presented.as_deref()).await;

    let clear = state.config.refresh_cookie().build_delete_cookie();

    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, clear)])
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/users/me (behind `require_access_token`)
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AuthResult<Json<MeResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let account = state
        .repo
        .find_by_id(&user.account_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(MeResponse {
        user: account.identity(),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn extract_refresh_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    platform::cookie::extract_cookie(headers, name)
}
