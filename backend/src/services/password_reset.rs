//! Forgot-password flow: single-use, hashed reset tokens delivered by mail.

use chrono::Duration;
use rand::RngCore;

use crate::error::AppError;
use crate::models::activity_log::actions;
use crate::models::password_reset::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::repositories::{
    activity_log as activity_repo, password_reset as reset_repo, session as session_repo,
    transaction::{begin_transaction, commit_transaction},
    user as user_repo,
};
use crate::state::AppState;
use crate::utils::email::password_reset_message;
use crate::utils::password::hash_password;
use crate::utils::request_meta::RequestMeta;
use crate::validation::{rules, validate_input};

pub const RESET_REQUESTED_MESSAGE: &str =
    "Si el correo está registrado, recibirá un enlace para restablecer su contraseña.";
pub const INVALID_TOKEN_MESSAGE: &str = "El enlace de restablecimiento no es válido o ha expirado";

/// 32 random bytes, hex encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Always succeeds for a well-formed email so callers cannot probe accounts.
pub async fn request_reset(
    state: &AppState,
    payload: &ForgotPasswordRequest,
    meta: &RequestMeta,
) -> Result<(), AppError> {
    validate_input(payload, &rules::forgot_password_rules())?;
    let pool = state.pool.as_ref();

    let Some(user) = user_repo::find_user_by_email(pool, &payload.email).await? else {
        tracing::info!("Password reset requested for unknown email");
        return Ok(());
    };
    if !user.active {
        tracing::info!(user_id = %user.id, "Password reset requested for inactive user");
        return Ok(());
    }

    let minutes = state.config.password_reset_expiration_minutes;
    let token = generate_reset_token();
    reset_repo::issue_reset_token(pool, user.id, &token, Duration::minutes(minutes as i64)).await?;

    let (subject, body) = password_reset_message(&state.config.app_base_url, &token, minutes);
    if let Err(err) = state.mailer.send(&user.email, &subject, &body).await {
        tracing::error!(user_id = %user.id, error = ?err, "Failed to send password reset email");
    }

    activity_repo::insert_activity_log(
        pool,
        user.id,
        actions::PASSWORD_RESET_REQUESTED,
        "Solicitud de restablecimiento de contraseña",
        meta.ip(),
    )
    .await?;
    Ok(())
}

/// Sets the new password, spends the token and revokes every open session.
pub async fn reset_password(
    state: &AppState,
    payload: &ResetPasswordRequest,
    meta: &RequestMeta,
) -> Result<(), AppError> {
    validate_input(
        payload,
        &rules::password_reset_rules(state.config.password_min_length),
    )?;
    let pool = state.pool.as_ref();

    let password_hash = hash_password(&payload.password)?;

    let mut tx = begin_transaction(pool).await?;
    let user_id = reset_repo::consume_reset_token(&mut *tx, payload.token.trim())
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN_MESSAGE.to_string()))?;
    user_repo::update_password_hash(&mut *tx, user_id, &password_hash).await?;
    session_repo::delete_sessions_for_user(&mut *tx, user_id).await?;
    activity_repo::insert_activity_log(
        &mut *tx,
        user_id,
        actions::PASSWORD_RESET,
        "Contraseña restablecida",
        meta.ip(),
    )
    .await?;
    commit_transaction(tx).await?;

    tracing::info!(user_id = %user_id, "Password reset completed");
    Ok(())
}
