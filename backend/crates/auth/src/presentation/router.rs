//! Auth Routers

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{self, AuthMiddlewareState};

/// Create the auth router (login/refresh/logout) with PostgreSQL repository
pub fn auth_router(repo: PgAccountRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .with_state(state)
}

/// Create the user router (register + me) with PostgreSQL repository
pub fn user_router(repo: PgAccountRepository, config: AuthConfig) -> Router {
    user_router_generic(repo, config)
}

/// Create a generic user router for any repository implementation
pub fn user_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    let mw_state = AuthMiddlewareState {
        config: state.config.clone(),
    };

    Router::new()
        .route("/", post(handlers::register::<R>))
        .route(
            "/me",
            get(handlers::me::<R>).layer(axum::middleware::from_fn(
                move |req, next| {
                    let mw_state = mw_state.clone();
                    async move { middleware::require_access_token(mw_state, req, next).await }
                },
            )),
        )
        .with_state(state)
}
