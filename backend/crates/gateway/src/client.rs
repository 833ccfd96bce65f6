//! API Client
//!
//! HTTP client for the auth backend. Carries the access token as a
//! bearer header, keeps the refresh token in the cookie jar, and
//! transparently recovers from expired access tokens: on a 401 the
//! request refreshes (coordinated so concurrent 401s share one
//! refresh) and replays itself exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::ser::Serialize;

use crate::error::{GatewayError, GatewayResult};
use crate::session::{Identity, Session};
use crate::single_flight::{Flight, SingleFlight};

/// Bound on the refresh call, and on a follower's wait for it. A
/// refresh that outlives this is treated as a refresh failure.
const REFRESH_WAIT: Duration = Duration::from_secs(10);

/// Client gateway to the auth API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    refresh_flight: SingleFlight,
}

// ============================================================================
// Wire payloads
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    access_token: String,
    user: Identity,
}

#[derive(Deserialize)]
struct UserPayload {
    user: Identity,
}

/// RFC 7807 problem body, fields we care about
#[derive(Deserialize)]
struct ProblemBody {
    title: Option<String>,
    detail: Option<String>,
}

impl ApiClient {
    /// Create a client for the API at `base_url`
    ///
    /// The cookie store is where the refresh token lives; it is
    /// path-scoped by the server and only ever travels to the auth
    /// endpoints.
    pub fn new(base_url: impl Into<String>) -> GatewayResult<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Arc::new(Session::new()),
            refresh_flight: SingleFlight::new(),
        })
    }

    /// Shared session state (auth status, access token)
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ========================================================================
    // Auth endpoints
    // ========================================================================

    /// POST /api/users
    pub async fn register(
        &self,
        email: &str,
        name: Option<&str>,
        password: &str,
    ) -> GatewayResult<Identity> {
        let response = self
            .http
            .post(self.url("/api/users"))
            .json(&serde_json::json!({
                "email": email,
                "name": name,
                "password": password,
            }))
            .send()
            .await?;

        let payload: UserPayload = Self::check(response).await?.json().await?;
        Ok(payload.user)
    }

    /// POST /api/auth/login
    ///
    /// On success the access token is installed in the session and
    /// the refresh cookie lands in the jar.
    pub async fn login(&self, email: &str, password: &str) -> GatewayResult<Identity> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::InvalidCredentials);
        }

        let payload: AuthPayload = Self::check(response).await?.json().await?;
        self.session
            .establish(payload.access_token, payload.user.clone());

        tracing::debug!(email = %payload.user.email, "Signed in");
        Ok(payload.user)
    }

    /// POST /api/auth/logout
    ///
    /// Local state is dropped whatever the server says; the server
    /// side is idempotent anyway.
    pub async fn logout(&self) -> GatewayResult<()> {
        let result = self.http.post(self.url("/api/auth/logout")).send().await;
        self.session.clear();

        result?;
        Ok(())
    }

    /// GET /api/users/me
    pub async fn me(&self) -> GatewayResult<Identity> {
        let payload: UserPayload = self.get("/api/users/me").await?;
        Ok(payload.user)
    }

    // ========================================================================
    // Generic authenticated requests
    // ========================================================================

    /// Authenticated GET
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let response = self.execute(Method::GET, path, None::<&()>).await?;
        Ok(response.json().await?)
    }

    /// Authenticated POST with a JSON body
    pub async fn post<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Run a request with one transparent refresh-and-replay on 401
    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> GatewayResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send_once(method.clone(), path, body).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check(response).await;
        }

        // Stale access token: recover, then replay exactly once
        self.recover().await?;

        let response = self.send_once(method, path, body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::SessionExpired);
        }

        Self::check(response).await
    }

    async fn send_once<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> GatewayResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method, self.url(path));

        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    // ========================================================================
    // Refresh recovery
    // ========================================================================

    /// Obtain a fresh access token, sharing one refresh across
    /// concurrent 401s
    async fn recover(&self) -> GatewayResult<String> {
        match self.refresh_flight.begin() {
            Flight::Leader => {
                let result = match tokio::time::timeout(REFRESH_WAIT, self.run_refresh()).await {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::RefreshTimeout),
                };

                match result {
                    Ok(payload) => {
                        self.session
                            .establish(payload.access_token.clone(), payload.user);
                        self.refresh_flight.resolve_all(&payload.access_token);
                        Ok(payload.access_token)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Refresh failed, dropping session");
                        self.refresh_flight.reject_all();
                        self.session.clear();
                        Err(GatewayError::SessionExpired)
                    }
                }
            }
            Flight::Follower(rx) => match tokio::time::timeout(REFRESH_WAIT, rx).await {
                Ok(Ok(Ok(access_token))) => Ok(access_token),
                Ok(_) => Err(GatewayError::SessionExpired),
                Err(_) => Err(GatewayError::RefreshTimeout),
            },
        }
    }

    async fn run_refresh(&self) -> GatewayResult<AuthPayload> {
        // No bearer header: the refresh cookie alone authenticates this
        let response = self.http.post(self.url("/api/auth/refresh")).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::SessionExpired);
        }

        Ok(Self::check(response).await?.json().await?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response) -> GatewayResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ProblemBody>()
            .await
            .ok()
            .and_then(|p| p.detail.or(p.title))
            .unwrap_or_else(|| status.to_string());

        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
