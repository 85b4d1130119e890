//! Session gate for protected routes.
//!
//! Resolves the signed session cookie (or a bearer token) into a
//! request-scoped [`Session`] plus the freshly loaded [`User`]. Page routes
//! fail with `303` redirects to the login form; `/api/` routes fail with
//! `401`/`403` JSON.

use axum::{
    extract::{OriginalUri, Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        session::Session,
        user::{User, UserRole},
    },
    repositories::{session as session_repo, user as user_repo},
    state::AppState,
    types::UserId,
    utils::{
        cookies::{build_clear_session_cookie, extract_cookie_value, SESSION_COOKIE_NAME},
        jwt::verify_session_token,
    },
};

pub const LOGIN_PATH: &str = "/login";
pub const ACCESS_DENIED_PATH: &str = "/login?error=acceso_denegado";

#[derive(Debug, PartialEq, Eq)]
enum GateFailure {
    /// No usable session; `had_token` tells whether a stale cookie should be cleared.
    Unauthenticated { had_token: bool },
    WrongRole,
}

pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate(state, request, next, &[]).await
}

pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    gate(state, request, next, &[UserRole::Admin]).await
}

pub async fn require_empleado(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate(state, request, next, &[UserRole::Empleado]).await
}

pub async fn require_auditor(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate(state, request, next, &[UserRole::Auditor]).await
}

async fn gate(state: AppState, mut request: Request, next: Next, roles: &[UserRole]) -> Response {
    let api = is_api_request(&request);

    let resolved = match resolve_session(request.headers(), &state.pool, &state.config).await {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };

    let outcome = match resolved {
        Some((session, user)) if roles.is_empty() || roles.contains(&session.role) => {
            Ok((session, user))
        }
        Some((session, _)) => {
            tracing::warn!(user_id = %session.user_id, role = session.role.as_str(), "Role not allowed");
            Err(GateFailure::WrongRole)
        }
        None => Err(GateFailure::Unauthenticated {
            had_token: bearer_or_cookie(request.headers()).is_some(),
        }),
    };

    match outcome {
        Ok((session, user)) => {
            request.extensions_mut().insert(session);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(failure) => failure_response(failure, api, &state.config),
    }
}

fn failure_response(failure: GateFailure, api: bool, config: &Config) -> Response {
    match (failure, api) {
        (GateFailure::Unauthenticated { .. }, true) => {
            AppError::Unauthorized("Debe iniciar sesión".to_string()).into_response()
        }
        (GateFailure::WrongRole, true) => {
            AppError::Forbidden("No tiene permisos para este recurso".to_string()).into_response()
        }
        (GateFailure::Unauthenticated { had_token }, false) => {
            let mut response = Redirect::to(LOGIN_PATH).into_response();
            if had_token {
                if let Ok(value) =
                    HeaderValue::from_str(&build_clear_session_cookie(config.cookie_options()))
                {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
            }
            response
        }
        (GateFailure::WrongRole, false) => Redirect::to(ACCESS_DENIED_PATH).into_response(),
    }
}

/// Looks up the session behind the request credentials. `Ok(None)` covers
/// every "not logged in" case: missing, forged, expired, revoked, or an
/// account that is gone or inactive.
pub async fn resolve_session(
    headers: &HeaderMap,
    pool: &PgPool,
    config: &Config,
) -> Result<Option<(Session, User)>, AppError> {
    let Some(token) = bearer_or_cookie(headers) else {
        return Ok(None);
    };
    let Ok(claims) = verify_session_token(&token, &config.jwt_secret) else {
        return Ok(None);
    };
    let Ok(user_id) = claims.sub.parse::<UserId>() else {
        return Ok(None);
    };

    let Some(stored) = session_repo::find_active_session(pool, &claims.jti).await? else {
        return Ok(None);
    };
    if stored.user_id != user_id {
        return Ok(None);
    }

    match user_repo::find_user_by_id(pool, user_id).await? {
        Some(user) if user.active => Ok(Some((Session::from_user(&user, claims.jti), user))),
        _ => Ok(None),
    }
}

fn bearer_or_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
        })
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    let token = rest.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn is_api_request(request: &Request) -> bool {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.path())
        .unwrap_or_else(|| request.uri().path());
    path.starts_with("/api/")
}
