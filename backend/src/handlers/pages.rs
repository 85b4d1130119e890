//! Public HTML pages: landing, login, registration, logout and password reset.

use axum::{
    extract::{Extension, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::{
        auth::{clear_cookie_headers, session_cookie_headers},
        page_message, FlashQuery,
    },
    middleware::auth::resolve_session,
    models::{
        password_reset::ResetPasswordRequest,
        session::Session,
        user::{LoginRequest, RegisterRequest},
    },
    services::{auth as auth_service, password_reset},
    state::AppState,
    utils::request_meta::RequestMeta,
    views::{HomeTemplate, HtmlTemplate, LoginTemplate, Nav, RegisterTemplate, ResetPasswordTemplate},
};

fn login_error_text(code: &str) -> Option<&'static str> {
    match code {
        "acceso_denegado" => Some("No tiene permisos para acceder a esa página"),
        "sesion_requerida" => Some("Debe iniciar sesión para continuar"),
        _ => None,
    }
}

fn login_notice_text(code: &str) -> Option<&'static str> {
    match code {
        "sesion_cerrada" => Some("Sesión cerrada correctamente"),
        "contrasena_restablecida" => Some("Contraseña actualizada. Ya puede iniciar sesión."),
        _ => None,
    }
}

/// Navigation for pages that are reachable with or without a session.
async fn optional_nav(state: &AppState, headers: &HeaderMap) -> Nav {
    match resolve_session(headers, &state.pool, &state.config).await {
        Ok(Some((session, _))) => Nav::for_session(&session),
        Ok(None) => Nav::anonymous(),
        Err(err) => {
            tracing::warn!(error = ?err, "Could not resolve session for public page");
            Nav::anonymous()
        }
    }
}

pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    HtmlTemplate(HomeTemplate {
        nav: optional_nav(&state, &headers).await,
    })
}

pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(flash): Query<FlashQuery>,
) -> Response {
    if let Ok(Some((session, _))) = resolve_session(&headers, &state.pool, &state.config).await {
        return Redirect::to(session.role.dashboard_path()).into_response();
    }

    HtmlTemplate(LoginTemplate {
        error: flash
            .error
            .as_deref()
            .and_then(login_error_text)
            .map(str::to_string),
        notice: flash
            .ok
            .as_deref()
            .and_then(login_notice_text)
            .map(str::to_string),
        ..Default::default()
    })
    .into_response()
}

pub async fn login_submit(
    State(state): State<AppState>,
    meta: RequestMeta,
    Form(payload): Form<LoginRequest>,
) -> Response {
    match auth_service::login(&state, &payload, &meta).await {
        Ok(outcome) => {
            let target = outcome.session.role.dashboard_path();
            match session_cookie_headers(
                &outcome.token,
                outcome.expires_at,
                state.config.cookie_options(),
            ) {
                Ok(headers) => (headers, Redirect::to(target)).into_response(),
                Err(err) => render_login_error(&payload.email, err),
            }
        }
        Err(err) => render_login_error(&payload.email, err),
    }
}

fn render_login_error(email: &str, err: AppError) -> Response {
    let template = LoginTemplate {
        email: email.trim().to_string(),
        error: Some(page_message(&err)),
        ..Default::default()
    };
    (err.status(), HtmlTemplate(template)).into_response()
}

pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Ok(Some((session, _))) = resolve_session(&headers, &state.pool, &state.config).await {
        return Redirect::to(session.role.dashboard_path()).into_response();
    }
    HtmlTemplate(RegisterTemplate::default()).into_response()
}

pub async fn register_submit(
    State(state): State<AppState>,
    meta: RequestMeta,
    Form(payload): Form<RegisterRequest>,
) -> Response {
    match auth_service::register(&state, &payload, &meta).await {
        Ok(user) => HtmlTemplate(LoginTemplate {
            email: user.email.clone(),
            notice: Some(auth_service::registration_message(&user).to_string()),
            ..Default::default()
        })
        .into_response(),
        Err(err) => {
            let template = RegisterTemplate {
                name: payload.name.trim().to_string(),
                email: payload.email.trim().to_string(),
                error: Some(page_message(&err)),
                ..Default::default()
            };
            (err.status(), HtmlTemplate(template)).into_response()
        }
    }
}

/// Always ends at the login page with the cookie cleared, even when the
/// session row could not be removed.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    meta: RequestMeta,
) -> Response {
    if let Err(err) = auth_service::logout(&state, &session, &meta).await {
        tracing::error!(user_id = %session.user_id, error = ?err, "Logout failed");
    }
    (
        clear_cookie_headers(state.config.cookie_options()),
        Redirect::to("/login?ok=sesion_cerrada"),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ResetPageQuery {
    #[serde(default)]
    pub token: String,
}

pub async fn reset_password_page(Query(query): Query<ResetPageQuery>) -> impl IntoResponse {
    HtmlTemplate(ResetPasswordTemplate {
        token: query.token,
        ..Default::default()
    })
}

pub async fn reset_password_submit(
    State(state): State<AppState>,
    meta: RequestMeta,
    Form(payload): Form<ResetPasswordRequest>,
) -> Response {
    match password_reset::reset_password(&state, &payload, &meta).await {
        Ok(()) => Redirect::to("/login?ok=contrasena_restablecida").into_response(),
        Err(err) => {
            let template = ResetPasswordTemplate {
                token: payload.token.clone(),
                error: Some(page_message(&err)),
                ..Default::default()
            };
            (err.status(), HtmlTemplate(template)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn unknown_flash_codes_are_ignored() {
        assert!(login_error_text("acceso_denegado").is_some());
        assert!(login_error_text("<script>").is_none());
        assert!(login_notice_text("sesion_cerrada").is_some());
        assert!(login_notice_text("anything").is_none());
    }

    #[test]
    fn lockout_renders_login_page_with_429() {
        let response = render_login_error(
            " ana@figgerenergy.gov.co ",
            AppError::TooManyRequests {
                message: "Bloqueado".into(),
                retry_after: 60,
            },
        );
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
