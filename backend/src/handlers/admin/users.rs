//! Account administration: JSON API and the `/admin/usuarios` page.
//!
//! Both surfaces go through [`UserLifecycle`], so self-targeting is refused
//! and every change is logged no matter which one was used.

use axum::{
    extract::{Extension, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};

use crate::{
    error::AppError,
    handlers::{page_message, parse_id, FlashQuery},
    models::{
        session::Session,
        user::{ChangeRoleRequest, UserResponse, UserRole},
        ApiResponse,
    },
    repositories::user as user_repo,
    services::user_lifecycle::{DeletionSummary, UserLifecycle},
    state::AppState,
    types::UserId,
    utils::request_meta::RequestMeta,
    validation::{rules, validate_input},
    views::{ErrorTemplate, HtmlTemplate, Nav, UsersTemplate},
};

fn lifecycle(state: &AppState) -> UserLifecycle<'_> {
    UserLifecycle::new(&state.pool, state.config.user_deletion_log_policy)
}

fn parse_role(payload: &ChangeRoleRequest) -> Result<UserRole, AppError> {
    validate_input(payload, &rules::role_change_rules())?;
    UserRole::parse(&payload.role)
        .ok_or_else(|| AppError::Validation(vec!["El rol seleccionado no es válido".to_string()]))
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    let users = user_repo::list_users(&state.pool).await?;
    Ok(Json(ApiResponse::ok(
        "Usuarios",
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

pub async fn activate_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let target = parse_id::<UserId>(&id)?;
    let user = lifecycle(&state).activate(&session, target, meta.ip()).await?;
    Ok(Json(ApiResponse::ok("Usuario activado", UserResponse::from(user))))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let target = parse_id::<UserId>(&id)?;
    let user = lifecycle(&state)
        .deactivate(&session, target, meta.ip())
        .await?;
    Ok(Json(ApiResponse::ok("Usuario desactivado", UserResponse::from(user))))
}

pub async fn change_user_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
    Json(payload): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let target = parse_id::<UserId>(&id)?;
    let role = parse_role(&payload)?;
    let user = lifecycle(&state)
        .change_role(&session, target, role, meta.ip())
        .await?;
    Ok(Json(ApiResponse::ok("Rol actualizado", UserResponse::from(user))))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<ApiResponse<DeletionSummary>>, AppError> {
    let target = parse_id::<UserId>(&id)?;
    let summary = lifecycle(&state).delete(&session, target, meta.ip()).await?;
    Ok(Json(ApiResponse::ok("Usuario eliminado", summary)))
}

fn notice_text(code: &str) -> Option<&'static str> {
    match code {
        "activado" => Some("Usuario activado"),
        "desactivado" => Some("Usuario desactivado"),
        "rol" => Some("Rol actualizado"),
        "eliminado" => Some("Usuario eliminado"),
        _ => None,
    }
}

fn error_text(code: &str) -> Option<&'static str> {
    match code {
        "propia_cuenta" => Some("No puede realizar esta acción sobre su propia cuenta"),
        "no_encontrado" => Some("Usuario no encontrado"),
        "rol_invalido" => Some("El rol seleccionado no es válido"),
        "error" => Some(crate::error::GENERIC_ERROR_MESSAGE),
        _ => None,
    }
}

fn error_code(err: &AppError) -> &'static str {
    match err {
        AppError::NotFound(_) => "no_encontrado",
        AppError::Validation(_) => "rol_invalido",
        AppError::BadRequest(_) => "propia_cuenta",
        other => {
            tracing::error!(error = ?other, "User management action failed");
            "error"
        }
    }
}

/// POST-redirect-GET back to the listing with a flash code.
fn back_to_listing<T>(result: Result<T, AppError>, ok_code: &str) -> Redirect {
    match result {
        Ok(_) => Redirect::to(&format!("/admin/usuarios?ok={ok_code}")),
        Err(err) => Redirect::to(&format!("/admin/usuarios?error={}", error_code(&err))),
    }
}

pub async fn users_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let nav = Nav::for_session(&session);
    match user_repo::list_users(&state.pool).await {
        Ok(users) => HtmlTemplate(UsersTemplate::new(
            nav,
            &users,
            &session,
            &state.config.time_zone,
            flash.ok.as_deref().and_then(notice_text).map(str::to_string),
            flash.error.as_deref().and_then(error_text).map(str::to_string),
        ))
        .into_response(),
        Err(err) => {
            let err = AppError::from(err);
            (
                err.status(),
                HtmlTemplate(ErrorTemplate {
                    nav,
                    message: page_message(&err),
                }),
            )
                .into_response()
        }
    }
}

pub async fn activate_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Redirect {
    let result = match parse_id::<UserId>(&id) {
        Ok(target) => lifecycle(&state)
            .activate(&session, target, meta.ip())
            .await
            .map_err(AppError::from),
        Err(_) => Err(AppError::NotFound(String::new())),
    };
    back_to_listing(result, "activado")
}

pub async fn deactivate_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Redirect {
    let result = match parse_id::<UserId>(&id) {
        Ok(target) => lifecycle(&state)
            .deactivate(&session, target, meta.ip())
            .await
            .map_err(AppError::from),
        Err(_) => Err(AppError::NotFound(String::new())),
    };
    back_to_listing(result, "desactivado")
}

pub async fn change_role_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
    Form(payload): Form<ChangeRoleRequest>,
) -> Redirect {
    let result = match (parse_id::<UserId>(&id), parse_role(&payload)) {
        (Ok(target), Ok(role)) => lifecycle(&state)
            .change_role(&session, target, role, meta.ip())
            .await
            .map_err(AppError::from),
        (Err(_), _) => Err(AppError::NotFound(String::new())),
        (_, Err(err)) => Err(err),
    };
    back_to_listing(result, "rol")
}

pub async fn delete_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Redirect {
    let result = match parse_id::<UserId>(&id) {
        Ok(target) => lifecycle(&state)
            .delete(&session, target, meta.ip())
            .await
            .map_err(AppError::from),
        Err(_) => Err(AppError::NotFound(String::new())),
    };
    back_to_listing(result, "eliminado")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_lifecycle::LifecycleError;
    use axum::http::header::LOCATION;

    #[test]
    fn self_target_redirects_with_own_account_code() {
        let err: AppError = LifecycleError::SelfTarget("eliminar").into();
        let response = back_to_listing::<()>(Err(err), "eliminado").into_response();
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/admin/usuarios?error=propia_cuenta"
        );
    }

    #[test]
    fn success_redirects_with_ok_code() {
        let response = back_to_listing(Ok(()), "activado").into_response();
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/admin/usuarios?ok=activado"
        );
        assert!(notice_text("activado").is_some());
        assert!(error_text("propia_cuenta").is_some());
    }

    #[test]
    fn role_must_be_one_of_the_portal_roles() {
        let ok = ChangeRoleRequest {
            role: "auditor".into(),
        };
        assert_eq!(parse_role(&ok).unwrap(), UserRole::Auditor);
        let bad = ChangeRoleRequest {
            role: "root".into(),
        };
        assert!(matches!(parse_role(&bad), Err(AppError::Validation(_))));
    }
}
