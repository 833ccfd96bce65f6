//! Single-flight refresh behavior against a mock API
//!
//! The mock counts refresh calls and answers slowly, so a burst of
//! 401s has to pile up behind one in-flight refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use gateway::{ApiClient, AuthState, GatewayError, Identity};

const USER_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

#[derive(Clone)]
struct MockState {
    refreshes: Arc<AtomicUsize>,
    refresh_ok: bool,
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "type": "https://httpstatuses.io/401",
            "title": "Unauthorized",
            "status": 401,
            "detail": "Token invalid",
        })),
    )
        .into_response()
}

async fn refresh(State(state): State<MockState>) -> axum::response::Response {
    if !state.refresh_ok {
        return unauthorized();
    }

    let n = state.refreshes.fetch_add(1, Ordering::SeqCst) + 1;

    // Slow enough for every concurrent 401 to join the flight
    tokio::time::sleep(Duration::from_millis(300)).await;

    Json(json!({
        "accessToken": format!("fresh-{n}"),
        "user": { "id": USER_ID, "email": "alice@example.com", "name": null },
    }))
    .into_response()
}

async fn protected(headers: HeaderMap) -> axum::response::Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer fresh-"));

    if authorized {
        Json(json!({ "ok": true })).into_response()
    } else {
        unauthorized()
    }
}

async fn locked() -> axum::response::Response {
    unauthorized()
}

fn mock_app(state: MockState) -> Router {
    Router::new()
        .route("/api/auth/refresh", post(refresh))
        .route("/protected", get(protected))
        .route("/locked", get(locked))
        .with_state(state)
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn stale_identity() -> Identity {
    Identity {
        id: USER_ID.parse().unwrap(),
        email: "alice@example.com".to_string(),
        name: None,
    }
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let refreshes = Arc::new(AtomicUsize::new(0));
    let base_url = spawn_server(mock_app(MockState {
        refreshes: refreshes.clone(),
        refresh_ok: true,
    }))
    .await;

    let client = Arc::new(ApiClient::new(base_url).unwrap());
    client
        .session()
        .establish("stale".to_string(), stale_identity());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get::<serde_json::Value>("/protected").await
        }));
    }

    for handle in handles {
        let body = handle.await.unwrap().expect("request recovers via refresh");
        assert_eq!(body["ok"], true);
    }

    assert_eq!(refreshes.load(Ordering::SeqCst), 1, "exactly one refresh");
    assert_eq!(client.session().access_token().as_deref(), Some("fresh-1"));
}

#[tokio::test]
async fn test_refresh_failure_fails_all_and_logs_out() {
    let base_url = spawn_server(mock_app(MockState {
        refreshes: Arc::new(AtomicUsize::new(0)),
        refresh_ok: false,
    }))
    .await;

    let client = Arc::new(ApiClient::new(base_url).unwrap());
    client
        .session()
        .establish("stale".to_string(), stale_identity());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get::<serde_json::Value>("/protected").await
        }));
    }

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, GatewayError::SessionExpired));
    }

    assert_eq!(client.session().auth_state(), AuthState::Unauthenticated);
    assert_eq!(client.session().access_token(), None);
}

#[tokio::test]
async fn test_replay_happens_at_most_once() {
    let refreshes = Arc::new(AtomicUsize::new(0));
    let base_url = spawn_server(mock_app(MockState {
        refreshes: refreshes.clone(),
        refresh_ok: true,
    }))
    .await;

    let client = ApiClient::new(base_url).unwrap();
    client
        .session()
        .establish("stale".to_string(), stale_identity());

    // /locked answers 401 even to a fresh token: the replay must not
    // loop back into another refresh
    let err = client
        .get::<serde_json::Value>("/locked")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::SessionExpired));
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}
