//! Login, logout and self-registration shared by the HTML forms and the JSON API.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::AppError;
use crate::models::activity_log::actions;
use crate::models::session::Session;
use crate::models::user::{LoginRequest, RegisterRequest, User, UserRole};
use crate::repositories::{session as session_repo, user as user_repo};
use crate::services::activity_log::{ActivityEntry, ActivityLogService};
use crate::services::login_throttle::{LoginThrottle, ThrottlePolicy};
use crate::state::AppState;
use crate::utils::jwt::{create_session_token, Claims};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::request_meta::RequestMeta;
use crate::validation::{rules, sanitize::sanitize_text, validate_input};

pub const INVALID_CREDENTIALS: &str = "Correo o contraseña incorrectos";
pub const INACTIVE_ACCOUNT: &str =
    "Su cuenta está inactiva o pendiente de aprobación por un administrador";

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session: Session,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    state: &AppState,
    payload: &LoginRequest,
    meta: &RequestMeta,
) -> Result<LoginOutcome, AppError> {
    validate_input(payload, &rules::login_rules())?;

    let identifier = payload.email.trim().to_lowercase();
    let pool = state.pool.as_ref();
    let throttle = LoginThrottle::new(pool.clone(), ThrottlePolicy::from_config(&state.config));
    throttle.check(&identifier).await?;

    let user = match user_repo::find_user_by_email(pool, &identifier).await? {
        Some(user) if verify_password(&payload.password, &user.password_hash)? => user,
        _ => {
            throttle.record(&identifier, meta.ip(), false).await?;
            tracing::info!(identifier = %identifier, "Login failed");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !user.active {
        throttle.record(&identifier, meta.ip(), false).await?;
        return Err(AppError::Forbidden(INACTIVE_ACCOUNT.to_string()));
    }

    let claims = Claims::for_user(&user, state.config.session_expiration_hours);
    let token = create_session_token(&claims, &state.config.jwt_secret)?;
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .unwrap_or_else(|| Utc::now() + Duration::hours(state.config.session_expiration_hours as i64));

    session_repo::create_session(
        pool,
        user.id,
        &claims.jti,
        meta.ip(),
        meta.user_agent(),
        expires_at,
    )
    .await?;
    throttle.record(&identifier, meta.ip(), true).await?;
    user_repo::touch_last_login(pool, user.id).await?;

    ActivityLogService::new(pool.clone())
        .record_best_effort(
            ActivityEntry::new(user.id, actions::LOGIN, "Inicio de sesión").with_ip(meta.ip()),
        )
        .await;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "Login succeeded");

    Ok(LoginOutcome {
        session: Session::from_user(&user, claims.jti),
        user,
        token,
        expires_at,
    })
}

pub async fn logout(state: &AppState, session: &Session, meta: &RequestMeta) -> Result<(), AppError> {
    let pool = state.pool.as_ref();
    session_repo::delete_session(pool, &session.jti).await?;
    ActivityLogService::new(pool.clone())
        .record_best_effort(
            ActivityEntry::new(session.user_id, actions::LOGOUT, "Cierre de sesión")
                .with_ip(meta.ip()),
        )
        .await;
    Ok(())
}

/// Creates an `empleado` account, inactive until approved when approval is required.
pub async fn register(
    state: &AppState,
    payload: &RegisterRequest,
    meta: &RequestMeta,
) -> Result<User, AppError> {
    let payload = RegisterRequest {
        name: sanitize_text(&payload.name),
        email: payload.email.trim().to_lowercase(),
        password: payload.password.clone(),
        password_confirm: payload.password_confirm.clone(),
    };
    validate_input(
        &payload,
        &rules::registration_rules(state.config.password_min_length),
    )?;

    let pool = state.pool.as_ref();
    if user_repo::email_exists(pool, &payload.email).await? {
        return Err(AppError::Conflict(
            "El correo electrónico ya está registrado".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(
        payload.name,
        payload.email,
        password_hash,
        UserRole::Empleado,
        !state.config.registration_requires_approval,
    );
    let user = user_repo::create_user(pool, &user).await?;

    ActivityLogService::new(pool.clone())
        .record_best_effort(
            ActivityEntry::new(user.id, actions::REGISTER, "Registro de cuenta")
                .with_ip(meta.ip()),
        )
        .await;
    tracing::info!(user_id = %user.id, active = user.active, "User registered");

    Ok(user)
}

pub fn registration_message(user: &User) -> &'static str {
    if user.active {
        "Registro exitoso. Ya puede iniciar sesión."
    } else {
        "Registro exitoso. Un administrador debe activar su cuenta antes de iniciar sesión."
    }
}
