//! Unit and handler tests for the auth crate
//!
//! Use cases run against the in-memory repository; handler tests
//! drive the real routers with `tower::ServiceExt::oneshot`.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use crate::application::{AuthConfig, RegisterInput, RegisterUseCase};
    use crate::infra::memory::InMemoryAccountRepository;

    pub const EMAIL: &str = "alice@example.com";
    pub const PASSWORD: &str = "correct-horse-battery";

    pub fn test_config() -> AuthConfig {
        AuthConfig {
            cookie_secure: false,
            ..AuthConfig::with_random_secrets()
        }
    }

    /// Fresh repo + config with one registered account
    pub async fn repo_with_account() -> (Arc<InMemoryAccountRepository>, Arc<AuthConfig>) {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let config = Arc::new(test_config());

        RegisterUseCase::new(repo.clone())
            .execute(RegisterInput {
                email: EMAIL.to_string(),
                name: Some("Alice".to_string()),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("seed account");

        (repo, config)
    }
}

#[cfg(test)]
mod register_tests {
    use std::sync::Arc;

    use super::support::*;
    use crate::application::{RegisterInput, RegisterUseCase};
    use crate::error::AuthError;
    use crate::infra::memory::InMemoryAccountRepository;

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let repo = Arc::new(InMemoryAccountRepository::new());

        let identity = RegisterUseCase::new(repo.clone())
            .execute(RegisterInput {
                email: "  Bob@Example.COM ".to_string(),
                name: None,
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(identity.email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let (repo, _) = repo_with_account().await;

        let err = RegisterUseCase::new(repo)
            .execute(RegisterInput {
                email: EMAIL.to_string(),
                name: None,
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateAccount));
    }

    #[tokio::test]
    async fn test_register_short_password_is_validation_error() {
        let repo = Arc::new(InMemoryAccountRepository::new());

        let err = RegisterUseCase::new(repo)
            .execute(RegisterInput {
                email: "short@example.com".to_string(),
                name: None,
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
    }
}

#[cfg(test)]
mod login_tests {
    use super::support::*;
    use crate::application::{LoginInput, LoginUseCase, RefreshUseCase};
    use crate::domain::repository::AccountRepository;
    use crate::domain::token::{self, TokenKind};
    use crate::domain::value_object::email::Email;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_login_issues_pair_and_stores_refresh() {
        let (repo, config) = repo_with_account().await;

        let session = LoginUseCase::new(repo.clone(), config.clone())
            .execute(LoginInput {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        let access = token::verify(&session.access_token, &config.access_secret).unwrap();
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.email, EMAIL);

        let refresh = token::verify(&session.refresh_token, &config.refresh_secret).unwrap();
        assert_eq!(refresh.kind, TokenKind::Refresh);

        // The freshly minted refresh token is now the stored one
        let account = repo
            .find_by_email(&Email::new(EMAIL).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            account.current_refresh_token.as_deref(),
            Some(session.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let (repo, config) = repo_with_account().await;

        let err = LoginUseCase::new(repo, config)
            .execute(LoginInput {
                email: EMAIL.to_string(),
                password: "not-the-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_email_indistinguishable_from_bad_password() {
        let (repo, config) = repo_with_account().await;

        // Short password against a missing account: still the same 401,
        // never a validation error that would leak account existence
        let err = LoginUseCase::new(repo, config)
            .execute(LoginInput {
                email: "a@b.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_second_login_invalidates_first_refresh_token() {
        let (repo, config) = repo_with_account().await;
        let login = LoginUseCase::new(repo.clone(), config.clone());

        let first = login
            .execute(LoginInput {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        let _second = login
            .execute(LoginInput {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        let err = RefreshUseCase::new(repo, config)
            .execute(Some(&first.refresh_token))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::RotatedTokenReuse));
    }
}

#[cfg(test)]
mod refresh_tests {
    use super::support::*;
    use crate::application::{LoginInput, LoginUseCase, RefreshUseCase};
    use crate::domain::token::{self, TokenKind};
    use crate::error::AuthError;
    use std::time::Duration;
    use uuid::Uuid;

    async fn logged_in_session(
        repo: &std::sync::Arc<crate::infra::memory::InMemoryAccountRepository>,
        config: &std::sync::Arc<crate::application::AuthConfig>,
    ) -> crate::application::IssuedSession {
        LoginUseCase::new(repo.clone(), config.clone())
            .execute(LoginInput {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let (repo, config) = repo_with_account().await;

        let err = RefreshUseCase::new(repo, config)
            .execute(None)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let (repo, config) = repo_with_account().await;

        let err = RefreshUseCase::new(repo, config)
            .execute(Some("garbage"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidSignatureToken));
    }

    #[tokio::test]
    async fn test_access_kind_rejected_even_with_refresh_key() {
        let (repo, config) = repo_with_account().await;

        // Correct key, wrong kind
        let forged = token::mint(
            Uuid::new_v4(),
            EMAIL,
            TokenKind::Access,
            &config.refresh_secret,
            Duration::from_secs(60),
        );

        let err = RefreshUseCase::new(repo, config)
            .execute(Some(&forged))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidSignatureToken));
    }

    #[tokio::test]
    async fn test_access_token_rejected_at_refresh() {
        let (repo, config) = repo_with_account().await;
        let session = logged_in_session(&repo, &config).await;

        // Signed with the access key, so the refresh key rejects it
        let err = RefreshUseCase::new(repo, config)
            .execute(Some(&session.access_token))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidSignatureToken));
    }

    #[tokio::test]
    async fn test_rotation_chain_succeeds() {
        let (repo, config) = repo_with_account().await;
        let session = logged_in_session(&repo, &config).await;
        let refresh = RefreshUseCase::new(repo, config);

        let mut current = session.refresh_token;
        for _ in 0..3 {
            let next = refresh.execute(Some(&current)).await.unwrap();
            assert_ne!(next.refresh_token, current);
            current = next.refresh_token;
        }
    }

    #[tokio::test]
    async fn test_rotated_token_is_single_use() {
        let (repo, config) = repo_with_account().await;
        let session = logged_in_session(&repo, &config).await;
        let refresh = RefreshUseCase::new(repo.clone(), config);

        let rotated = refresh.execute(Some(&session.refresh_token)).await.unwrap();

        // Replaying the superseded token trips reuse detection
        let err = refresh
            .execute(Some(&session.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RotatedTokenReuse));

        // Reuse detection cleared the slot, so the winner dies with it
        let err = refresh
            .execute(Some(&rotated.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RotatedTokenReuse));
    }

    #[tokio::test]
    async fn test_access_token_survives_rotation() {
        let (repo, config) = repo_with_account().await;
        let session = logged_in_session(&repo, &config).await;

        RefreshUseCase::new(repo, config.clone())
            .execute(Some(&session.refresh_token))
            .await
            .unwrap();

        // Access tokens are stateless; rotation does not revoke them
        assert!(token::verify(&session.access_token, &config.access_secret).is_ok());
    }
}

#[cfg(test)]
mod logout_tests {
    use super::support::*;
    use crate::application::{LoginInput, LoginUseCase, LogoutUseCase, RefreshUseCase};
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_logout_clears_stored_token() {
        let (repo, config) = repo_with_account().await;

        let session = LoginUseCase::new(repo.clone(), config.clone())
            .execute(LoginInput {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        LogoutUseCase::new(repo.clone(), config.clone())
            .execute(Some(&session.refresh_token))
            .await
            .unwrap();

        // The cleared slot makes the old refresh token dead on arrival
        let err = RefreshUseCase::new(repo, config)
            .execute(Some(&session.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RotatedTokenReuse));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (repo, config) = repo_with_account().await;
        let logout = LogoutUseCase::new(repo.clone(), config.clone());

        let session = LoginUseCase::new(repo, config)
            .execute(LoginInput {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        logout.execute(Some(&session.refresh_token)).await.unwrap();
        logout.execute(Some(&session.refresh_token)).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_without_token_succeeds() {
        let (repo, config) = repo_with_account().await;

        LogoutUseCase::new(repo, config)
            .execute(None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logout_with_garbage_token_succeeds() {
        let (repo, config) = repo_with_account().await;

        LogoutUseCase::new(repo, config)
            .execute(Some("not-a-token"))
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod handler_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::support::*;
    use crate::infra::memory::InMemoryAccountRepository;
    use crate::presentation::router::{auth_router_generic, user_router_generic};

    fn app(repo: InMemoryAccountRepository) -> Router {
        let config = test_config();
        Router::new()
            .nest("/api/auth", auth_router_generic(repo.clone(), config.clone()))
            .nest("/api/users", user_router_generic(repo, config))
    }

    async fn register(app: &Router) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(format!(
                        r#"{{"email":"{EMAIL}","name":"Alice","password":"{PASSWORD}"}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    async fn login(app: &Router) -> (String, String) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(format!(
                        r#"{{"email":"{EMAIL}","password":"{PASSWORD}"}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets the refresh cookie")
            .to_str()
            .unwrap()
            .to_string();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let access_token = json["accessToken"].as_str().unwrap().to_string();

        (access_token, cookie)
    }

    fn cookie_pair(set_cookie: &str) -> String {
        // "refresh_token=<value>; HttpOnly; ..." -> "refresh_token=<value>"
        set_cookie
            .split(';')
            .next()
            .unwrap()
            .trim()
            .to_string()
    }

    #[tokio::test]
    async fn test_login_sets_scoped_refresh_cookie() {
        let app = app(InMemoryAccountRepository::new());
        register(&app).await;

        let (_, set_cookie) = login(&app).await;

        assert!(set_cookie.starts_with("refresh_token="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Path=/api/auth"));
        assert!(set_cookie.contains("SameSite=Lax"));
    }

    #[tokio::test]
    async fn test_refresh_rotates_cookie() {
        let app = app(InMemoryAccountRepository::new());
        register(&app).await;
        let (_, set_cookie) = login(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/refresh")
                    .header(header::COOKIE, cookie_pair(&set_cookie))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let rotated = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert_ne!(cookie_pair(rotated), cookie_pair(&set_cookie));
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_cookie() {
        let app = app(InMemoryAccountRepository::new());
        register(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/refresh")
                    .header(header::COOKIE, "refresh_token=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let cleared = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("failed refresh clears the cookie")
            .to_str()
            .unwrap();
        assert!(cleared.starts_with("refresh_token="));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_refresh_without_cookie_is_unauthorized() {
        let app = app(InMemoryAccountRepository::new());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_always_no_content() {
        let app = app(InMemoryAccountRepository::new());

        // No account, no cookie: still a clean logout
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cleared = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_me_requires_bearer_token() {
        let app = app(InMemoryAccountRepository::new());
        register(&app).await;
        let (access_token, _) = login(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/users/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/users/me")
                    .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user"]["email"], EMAIL);
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_bearer() {
        let app = app(InMemoryAccountRepository::new());
        register(&app).await;
        let (_, set_cookie) = login(&app).await;

        let refresh_token = cookie_pair(&set_cookie)
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/users/me")
                    .header(header::AUTHORIZATION, format!("Bearer {refresh_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
