//! Role dashboards (HTML) and their JSON counterparts.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::{
    error::{AppError, GENERIC_ERROR_MESSAGE},
    handlers::{parse_id, FlashQuery},
    models::{
        dashboard::{DashboardStats, Notification},
        session::Session,
        ApiResponse,
    },
    services::{alerts as alert_service, dashboard},
    state::AppState,
    types::AlertId,
    utils::request_meta::RequestMeta,
    views::{
        AdminDashboardTemplate, AuditorDashboardTemplate, EmpleadoDashboardTemplate, ErrorTemplate,
        HtmlTemplate, Nav,
    },
};

fn dashboard_failure(nav: Nav, err: sqlx::Error) -> Response {
    tracing::error!(error = ?err, "Dashboard query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        HtmlTemplate(ErrorTemplate {
            nav,
            message: GENERIC_ERROR_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

pub async fn admin_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    let nav = Nav::for_session(&session);
    match dashboard::admin_dashboard(&state.pool).await {
        Ok(data) => HtmlTemplate(AdminDashboardTemplate::new(nav, &data, &state.config.time_zone))
            .into_response(),
        Err(err) => dashboard_failure(nav, err),
    }
}

pub async fn empleado_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let nav = Nav::for_session(&session);
    match dashboard::empleado_dashboard(&state.pool, session.user_id).await {
        Ok(data) => {
            let mut template = EmpleadoDashboardTemplate::new(nav, &data, &state.config.time_zone);
            template.notice = flash.ok.as_deref().and_then(take_notice).map(str::to_string);
            template.error = flash.error.as_deref().and_then(take_error).map(str::to_string);
            HtmlTemplate(template).into_response()
        }
        Err(err) => dashboard_failure(nav, err),
    }
}

pub async fn auditor_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    let nav = Nav::for_session(&session);
    match dashboard::auditor_dashboard(&state.pool).await {
        Ok(data) => {
            HtmlTemplate(AuditorDashboardTemplate::new(nav, &data, &state.config.time_zone))
                .into_response()
        }
        Err(err) => dashboard_failure(nav, err),
    }
}

fn take_notice(code: &str) -> Option<&'static str> {
    (code == "alerta_tomada").then_some("La alerta quedó asignada a usted")
}

fn take_error(code: &str) -> Option<&'static str> {
    match code {
        "no_disponible" => Some(alert_service::ALERT_UNAVAILABLE),
        "no_encontrada" => Some(alert_service::ALERT_NOT_FOUND),
        "error" => Some(GENERIC_ERROR_MESSAGE),
        _ => None,
    }
}

/// Form post from the available-alerts table.
pub async fn take_alert_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Redirect {
    let result = match parse_id::<AlertId>(&id) {
        Ok(id) => alert_service::take_alert(&state.pool, &session, id, meta.ip()).await,
        Err(err) => Err(err),
    };
    let query = match result {
        Ok(_) => "ok=alerta_tomada",
        Err(AppError::Conflict(_)) => "error=no_disponible",
        Err(AppError::NotFound(_)) | Err(AppError::BadRequest(_)) => "error=no_encontrada",
        Err(err) => {
            tracing::error!(error = ?err, "Taking alert from dashboard failed");
            "error=error"
        }
    };
    Redirect::to(&format!("/dashboard/empleado?{query}"))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = dashboard::stats_for(&state.pool, &session).await?;
    Ok(Json(ApiResponse::ok("Estadísticas del panel", stats)))
}

pub async fn notifications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    let items = dashboard::notifications_for(&state.pool, &session).await?;
    Ok(Json(ApiResponse::ok("Notificaciones", items)))
}
