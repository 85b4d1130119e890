//! Typed HTTP client for the portal's `/api` surface.
//!
//! GET requests are retried (3 attempts, linear backoff) on transport errors
//! and 5xx responses, and successful GET bodies are cached for five minutes
//! per URL and token. POST/PUT/DELETE are sent once and clear the cache when
//! they succeed.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    handlers::auth::LoginResponse,
    models::{
        alert::{Alert, AlertStatus, CreateAlert},
        dashboard::Notification,
        user::UserResponse,
    },
    services::user_lifecycle::DeletionSummary,
};

pub const GET_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(250);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status(),
            ClientError::Decode(_) => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(err) => err.is_connect() || err.is_timeout() || err.is_request(),
            ClientError::Api { status, .. } => status.is_server_error(),
            ClientError::Decode(_) => false,
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: String,
}

struct CachedBody {
    stored_at: Instant,
    body: Value,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    backoff: Duration,
    cache_ttl: Option<Duration>,
    cache: Mutex<HashMap<String, CachedBody>>,
}

impl ApiClient {
    pub fn new_with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("figger-backend/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            backoff: DEFAULT_BACKOFF,
            cache_ttl: Some(DEFAULT_CACHE_TTL),
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// `None` disables the GET cache.
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
        self.clear_cache();
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Logs in and keeps the returned bearer token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response: LoginResponse = self
            .send(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        self.set_token(Some(response.token.clone()));
        Ok(response)
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.send::<Value>(Method::POST, "/api/auth/logout", None)
            .await?;
        self.set_token(None);
        Ok(())
    }

    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        self.get("/api/auth/me").await
    }

    pub async fn dashboard_stats(&self) -> Result<Value, ClientError> {
        self.get("/api/dashboard/stats").await
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.get("/api/dashboard/notifications").await
    }

    pub async fn list_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<Alert>, ClientError> {
        match status {
            Some(status) => self.get(&format!("/api/alerts?status={}", status.as_str())).await,
            None => self.get("/api/alerts").await,
        }
    }

    pub async fn available_alerts(&self) -> Result<Vec<Alert>, ClientError> {
        self.get("/api/alerts/available").await
    }

    pub async fn create_alert(&self, alert: &CreateAlert) -> Result<Alert, ClientError> {
        self.send(Method::POST, "/api/alerts", Some(to_value(alert)?))
            .await
    }

    pub async fn take_alert(&self, id: &str) -> Result<Alert, ClientError> {
        self.send(Method::POST, &format!("/api/alerts/{id}/take"), None)
            .await
    }

    pub async fn update_alert_status(
        &self,
        id: &str,
        status: AlertStatus,
        notes: Option<&str>,
    ) -> Result<Alert, ClientError> {
        self.send(
            Method::PUT,
            &format!("/api/alerts/{id}/status"),
            Some(json!({ "status": status, "notes": notes })),
        )
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ClientError> {
        self.get("/api/admin/users").await
    }

    pub async fn deactivate_user(&self, id: &str) -> Result<UserResponse, ClientError> {
        self.send(Method::POST, &format!("/api/admin/users/{id}/deactivate"), None)
            .await
    }

    pub async fn activate_user(&self, id: &str) -> Result<UserResponse, ClientError> {
        self.send(Method::POST, &format!("/api/admin/users/{id}/activate"), None)
            .await
    }

    pub async fn change_user_role(&self, id: &str, role: &str) -> Result<UserResponse, ClientError> {
        self.send(
            Method::PUT,
            &format!("/api/admin/users/{id}/role"),
            Some(json!({ "role": role })),
        )
        .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<DeletionSummary, ClientError> {
        self.send(Method::DELETE, &format!("/api/admin/users/{id}"), None)
            .await
    }

    /// GET with retry and cache.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let key = self.cache_key(&url);

        if let Some(body) = self.cached(&key) {
            tracing::debug!(%url, "Serving GET from cache");
            return decode_data(body);
        }

        let mut attempt = 1;
        let body = loop {
            match self.execute(Method::GET, &url, None).await {
                Ok(body) => break body,
                Err(err) if attempt < GET_ATTEMPTS && err.is_retryable() => {
                    tracing::warn!(%url, attempt, error = %err, "GET failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        if let Some(ttl) = self.cache_ttl {
            if !ttl.is_zero() {
                self.cache
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .insert(
                        key,
                        CachedBody {
                            stored_at: Instant::now(),
                            body: body.clone(),
                        },
                    );
            }
        }
        decode_data(body)
    }

    /// Non-idempotent request: one attempt, no cache.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let body = self.execute(method, &url, body).await?;
        self.clear_cache();
        decode_data(body)
    }

    async fn execute(&self, method: Method, url: &str, body: Option<Value>) -> Result<Value, ClientError> {
        let mut request = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|err| ClientError::Decode(err.to_string()));
        }

        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.error, body.message),
            Err(_) => (String::new(), text),
        };
        Err(ClientError::Api {
            status,
            code,
            message,
        })
    }

    fn cached(&self, key: &str) -> Option<Value> {
        let ttl = self.cache_ttl?;
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match cache.get(key) {
            Some(entry) if entry.stored_at.elapsed() < ttl => Some(entry.body.clone()),
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cache_key(&self, url: &str) -> String {
        format!("{}|{}", self.token.as_deref().unwrap_or_default(), url)
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}

fn decode_data<T: DeserializeOwned>(body: Value) -> Result<T, ClientError> {
    serde_json::from_value::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|err| ClientError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::get, Json, Router};
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        format!("http://{addr}")
    }

    fn client(base: String) -> ApiClient {
        ApiClient::new_with_base_url(base)
            .expect("build client")
            .with_backoff(Duration::from_millis(5))
    }

    fn flaky_route(hits: Arc<AtomicU32>, failures: u32) -> Router {
        let handler = move || {
            let hits = hits.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    (
                        AxumStatus::SERVICE_UNAVAILABLE,
                        Json(json!({"success": false, "message": "down", "error": "UNAVAILABLE"})),
                    )
                } else {
                    (
                        AxumStatus::OK,
                        Json(json!({"success": true, "message": "ok", "data": n})),
                    )
                }
            }
        };
        Router::new().route("/api/flaky", get(handler.clone()).post(handler))
    }

    #[tokio::test]
    async fn get_retries_server_errors_up_to_three_attempts() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = serve(flaky_route(hits.clone(), 2)).await;
        let client = client(base).with_cache_ttl(None);

        let value: u32 = client.get("/api/flaky").await.expect("third attempt succeeds");
        assert_eq!(value, 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn get_gives_up_after_three_attempts() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = serve(flaky_route(hits.clone(), 10)).await;
        let client = client(base).with_cache_ttl(None);

        let err = client.get::<u32>("/api/flaky").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(hits.load(Ordering::SeqCst), GET_ATTEMPTS);
    }

    #[tokio::test]
    async fn post_fails_fast() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = serve(flaky_route(hits.clone(), 1)).await;
        let client = client(base);

        let err = client
            .send::<u32>(Method::POST, "/api/flaky", None)
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, code, message } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(code, "UNAVAILABLE");
                assert_eq!(message, "down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/api/alerts/available",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        AxumStatus::UNAUTHORIZED,
                        Json(json!({"success": false, "message": "Debe iniciar sesión", "error": "UNAUTHORIZED"})),
                    )
                }
            }),
        );
        let client = client(serve(app).await);

        let err = client.available_alerts().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_gets_are_cached_until_a_mutation() {
        let hits = Arc::new(AtomicU32::new(0));
        let base = serve(flaky_route(hits.clone(), 0)).await;
        let client = client(base);

        let first: u32 = client.get("/api/flaky").await.unwrap();
        let second: u32 = client.get("/api/flaky").await.unwrap();
        assert_eq!((first, second), (1, 1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let _: u32 = client.send(Method::POST, "/api/flaky", None).await.unwrap();
        let third: u32 = client.get("/api/flaky").await.unwrap();
        assert_eq!(third, 3);
    }

    #[tokio::test]
    async fn unreachable_server_surfaces_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(format!("http://{addr}")).with_cache_ttl(None);
        let err = client.get::<Value>("/api/health").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
