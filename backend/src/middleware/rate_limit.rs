use axum::body::Body;
use axum::http::{HeaderMap, Response};
use axum::response::IntoResponse;
use governor::middleware::StateInformationMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor, GovernorError,
    GovernorLayer,
};

use crate::config::Config;
use crate::error::AppError;

const TOO_MANY_REQUESTS_MESSAGE: &str = "Demasiadas solicitudes. Intente de nuevo más tarde.";

pub type CredentialLimiter = GovernorLayer<PeerIpKeyExtractor, StateInformationMiddleware, Body>;

/// Token bucket per client address in front of the login and password reset
/// endpoints. The account lockout in `login_throttle` is the per-email
/// counterpart.
pub fn credential_rate_limiter(config: &Config) -> CredentialLimiter {
    let capacity = config.rate_limit_ip_max_requests.max(1);
    let window = Duration::from_secs(config.rate_limit_ip_window_seconds.max(1));
    let refill = (window / capacity).max(Duration::from_millis(1));

    let quota = GovernorConfigBuilder::default()
        .period(refill)
        .burst_size(capacity)
        .key_extractor(PeerIpKeyExtractor)
        .use_headers()
        .finish()
        .expect("credential limiter quota is non-zero");

    GovernorLayer::new(Arc::new(quota)).error_handler(reject)
}

fn reject(error: GovernorError) -> Response<Body> {
    let (app_error, extra_headers) = match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            tracing::warn!(retry_after = wait_time, "Credential endpoint throttled by IP");
            (
                AppError::TooManyRequests {
                    message: TOO_MANY_REQUESTS_MESSAGE.to_string(),
                    retry_after: wait_time,
                },
                headers,
            )
        }
        GovernorError::UnableToExtractKey => (
            AppError::InternalServerError(anyhow::anyhow!("peer address unavailable for limiter")),
            None,
        ),
        GovernorError::Other { code, msg, headers } => {
            let message = msg.unwrap_or_else(|| TOO_MANY_REQUESTS_MESSAGE.to_string());
            let app_error = if code.is_server_error() {
                AppError::InternalServerError(anyhow::anyhow!(message))
            } else {
                AppError::BadRequest(message)
            };
            (app_error, headers)
        }
    };

    let mut response = app_error.into_response();
    merge_headers(&mut response, extra_headers);
    response
}

fn merge_headers(response: &mut Response<Body>, extra: Option<HeaderMap>) {
    if let Some(extra) = extra {
        response.headers_mut().extend(extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::test_config;
    use axum::{
        extract::connect_info::MockConnectInfo,
        http::{header::CONTENT_TYPE, Request, StatusCode},
        routing::post,
        Router,
    };
    use http_body_util::BodyExt;
    use std::net::SocketAddr;
    use tower::ServiceExt;

    #[test]
    fn zero_quota_settings_are_clamped() {
        let mut config = test_config();
        config.rate_limit_ip_max_requests = 0;
        config.rate_limit_ip_window_seconds = 0;
        let _limiter = credential_rate_limiter(&config);
    }

    #[test]
    fn throttled_request_carries_retry_after() {
        let response = reject(GovernorError::TooManyRequests {
            wait_time: 12,
            headers: None,
        });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(CONTENT_TYPE).is_some());
        assert_eq!(response.headers().get("retry-after").unwrap(), "12");
    }

    #[test]
    fn missing_peer_address_is_a_server_error() {
        let response = reject(GovernorError::UnableToExtractKey);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn governor_headers_survive_on_other_errors() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", "5".parse().unwrap());

        let response = reject(GovernorError::Other {
            code: StatusCode::BAD_REQUEST,
            msg: None,
            headers: Some(headers),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get("x-ratelimit-limit").unwrap(), "5");
    }

    #[tokio::test]
    async fn second_login_from_same_address_is_throttled() {
        let mut config = test_config();
        config.rate_limit_ip_max_requests = 1;
        config.rate_limit_ip_window_seconds = 60;
        let app = Router::new()
            .route("/api/auth/login", post(|| async { "ok" }))
            .layer(credential_rate_limiter(&config))
            .layer(MockConnectInfo(SocketAddr::from(([198, 51, 100, 4], 5000))));

        let login = || {
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(login()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(login()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = second.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "TOO_MANY_REQUESTS");
        assert!(json["details"]["retry_after"].as_u64().is_some());
    }
}
