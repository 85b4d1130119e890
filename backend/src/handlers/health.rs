use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::AppError, models::ApiResponse, state::AppState};

/// Liveness plus a database round trip.
pub async fn health(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool.as_ref())
        .await?;
    Ok(Json(ApiResponse::ok("ok", json!({ "database": "up" }))))
}
