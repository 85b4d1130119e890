//! JSON authentication endpoints under `/api/auth`.

use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{
        password_reset::{ForgotPasswordRequest, ResetPasswordRequest},
        session::Session,
        user::{LoginRequest, User, UserResponse},
        ApiResponse,
    },
    services::{auth as auth_service, password_reset},
    state::AppState,
    utils::{
        cookies::{build_clear_session_cookie, build_session_cookie, CookieOptions},
        request_meta::RequestMeta,
    },
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// Same value as the `figger_session` cookie, for `Authorization: Bearer` clients.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub redirect_to: String,
}

pub async fn login(
    State(state): State<AppState>,
    meta: RequestMeta,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<ApiResponse<LoginResponse>>), AppError> {
    let outcome = auth_service::login(&state, &payload, &meta).await?;
    let headers = session_cookie_headers(
        &outcome.token,
        outcome.expires_at,
        state.config.cookie_options(),
    )?;

    let response = LoginResponse {
        redirect_to: outcome.user.role.dashboard_path().to_string(),
        user: UserResponse::from(outcome.user),
        token: outcome.token,
        expires_at: outcome.expires_at,
    };
    Ok((headers, Json(ApiResponse::ok("Inicio de sesión exitoso", response))))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    meta: RequestMeta,
) -> Result<(HeaderMap, Json<ApiResponse<()>>), AppError> {
    auth_service::logout(&state, &session, &meta).await?;
    Ok((
        clear_cookie_headers(state.config.cookie_options()),
        Json(ApiResponse::ok("Sesión cerrada", ())),
    ))
}

pub async fn me(Extension(user): Extension<User>) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok("Usuario actual", UserResponse::from(user)))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    meta: RequestMeta,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    password_reset::request_reset(&state, &payload, &meta).await?;
    Ok(Json(ApiResponse::ok(
        password_reset::RESET_REQUESTED_MESSAGE,
        (),
    )))
}

pub async fn reset_password(
    State(state): State<AppState>,
    meta: RequestMeta,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    password_reset::reset_password(&state, &payload, &meta).await?;
    Ok(Json(ApiResponse::ok(
        "Contraseña actualizada. Inicie sesión con su nueva contraseña.",
        (),
    )))
}

/// `Set-Cookie` for a freshly issued session token.
pub fn session_cookie_headers(
    token: &str,
    expires_at: DateTime<Utc>,
    options: CookieOptions,
) -> Result<HeaderMap, AppError> {
    let seconds = (expires_at - Utc::now()).num_seconds().max(0) as u64;
    let cookie = build_session_cookie(token, StdDuration::from_secs(seconds), options);
    let value = HeaderValue::from_str(&cookie)
        .map_err(|err| AppError::InternalServerError(anyhow::anyhow!(err)))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

pub fn clear_cookie_headers(options: CookieOptions) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&build_clear_session_cookie(options)) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::cookies::SameSite;
    use chrono::Duration;

    fn options() -> CookieOptions {
        CookieOptions {
            secure: true,
            same_site: SameSite::Strict,
        }
    }

    #[test]
    fn session_cookie_carries_remaining_lifetime() {
        let headers =
            session_cookie_headers("tok", Utc::now() + Duration::hours(8), options()).unwrap();
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("figger_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        let max_age: u64 = cookie
            .split("Max-Age=")
            .nth(1)
            .and_then(|rest| rest.split(';').next())
            .and_then(|value| value.parse().ok())
            .unwrap();
        assert!(max_age > 8 * 3600 - 60 && max_age <= 8 * 3600);
    }

    #[test]
    fn expired_session_gets_zero_max_age() {
        let headers =
            session_cookie_headers("tok", Utc::now() - Duration::hours(1), options()).unwrap();
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let headers = clear_cookie_headers(options());
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("figger_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
