use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};

use crate::{
    error::AppError,
    handlers::parse_id,
    models::{
        alert::{Alert, AlertListQuery, CreateAlert, UpdateAlertStatus},
        session::Session,
        ApiResponse,
    },
    repositories::alert as alert_repo,
    services::alerts as alert_service,
    state::AppState,
    types::AlertId,
    utils::request_meta::RequestMeta,
};

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<ApiResponse<Vec<Alert>>>, AppError> {
    let status = alert_service::parse_status_filter(query.status.as_deref())?;
    let alerts = alert_repo::list_alerts(&state.pool, status).await?;
    Ok(Json(ApiResponse::ok("Alertas", alerts)))
}

pub async fn list_available_alerts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Alert>>>, AppError> {
    let alerts = alert_repo::list_available_alerts(&state.pool).await?;
    Ok(Json(ApiResponse::ok("Alertas disponibles", alerts)))
}

pub async fn create_alert(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    meta: RequestMeta,
    Json(payload): Json<CreateAlert>,
) -> Result<Json<ApiResponse<Alert>>, AppError> {
    let alert = alert_service::create_alert(&state.pool, &session, &payload, meta.ip()).await?;
    Ok(Json(ApiResponse::ok("Alerta registrada", alert)))
}

pub async fn take_alert(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<ApiResponse<Alert>>, AppError> {
    let id = parse_id::<AlertId>(&id)?;
    let alert = alert_service::take_alert(&state.pool, &session, id, meta.ip()).await?;
    Ok(Json(ApiResponse::ok("Alerta asignada", alert)))
}

pub async fn update_alert_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
    Json(payload): Json<UpdateAlertStatus>,
) -> Result<Json<ApiResponse<Alert>>, AppError> {
    let id = parse_id::<AlertId>(&id)?;
    let alert =
        alert_service::update_status(&state.pool, &session, id, &payload, meta.ip()).await?;
    Ok(Json(ApiResponse::ok("Estado de la alerta actualizado", alert)))
}
