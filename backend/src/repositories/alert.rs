//! Mining alerts: listing, assignment and status transitions.

use chrono::Utc;
use sqlx::{PgExecutor, PgPool};

use crate::models::alert::{Alert, AlertStatus};
use crate::types::{AlertId, UserId};

const ALERT_COLUMNS: &str =
    "id, location, activity, risk_level, status, assigned_user_id, notes, detected_at, resolved_at";

/// Sort key for `risk_level`, highest severity first when ordered DESC.
pub const RISK_RANK_SQL: &str =
    "CASE risk_level WHEN 'critico' THEN 4 WHEN 'alto' THEN 3 WHEN 'medio' THEN 2 ELSE 1 END";

pub async fn list_alerts(
    pool: &PgPool,
    status: Option<AlertStatus>,
) -> Result<Vec<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        r#"
        SELECT {ALERT_COLUMNS}
        FROM alerts
        WHERE ($1::TEXT IS NULL OR status = $1)
        ORDER BY detected_at DESC, id
        "#
    ))
    .bind(status)
    .fetch_all(pool)
    .await
}

/// Unassigned alerts still in `activa`, riskiest first, then oldest first.
pub async fn list_available_alerts(pool: &PgPool) -> Result<Vec<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        r#"
        SELECT {ALERT_COLUMNS}
        FROM alerts
        WHERE assigned_user_id IS NULL AND status = 'activa'
        ORDER BY {RISK_RANK_SQL} DESC, detected_at ASC, id
        "#
    ))
    .fetch_all(pool)
    .await
}

/// Alerts assigned to `user_id`, open ones first.
pub async fn list_alerts_assigned_to(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        r#"
        SELECT {ALERT_COLUMNS}
        FROM alerts
        WHERE assigned_user_id = $1
        ORDER BY CASE WHEN status IN ('resuelta', 'falsa') THEN 1 ELSE 0 END,
                 {RISK_RANK_SQL} DESC,
                 detected_at ASC,
                 id
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_alert(pool: &PgPool, id: AlertId) -> Result<Option<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_alert(pool: &PgPool, alert: &Alert) -> Result<Alert, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        r#"
        INSERT INTO alerts (id, location, activity, risk_level, status, assigned_user_id, notes, detected_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ALERT_COLUMNS}
        "#
    ))
    .bind(alert.id)
    .bind(&alert.location)
    .bind(&alert.activity)
    .bind(alert.risk_level)
    .bind(alert.status)
    .bind(alert.assigned_user_id)
    .bind(&alert.notes)
    .bind(alert.detected_at)
    .fetch_one(pool)
    .await
}

/// Assigns the alert to `user_id` only while it is unassigned and `activa`.
/// `None` means someone else got there first or the alert is not available.
pub async fn take_alert(
    pool: &PgPool,
    id: AlertId,
    user_id: UserId,
) -> Result<Option<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        r#"
        UPDATE alerts
        SET assigned_user_id = $2, status = 'en_proceso'
        WHERE id = $1 AND assigned_user_id IS NULL AND status = 'activa'
        RETURNING {ALERT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Moves the alert to `status`. `resolved_at` is stamped on closing and
/// cleared when the alert is reopened.
pub async fn update_alert_status(
    pool: &PgPool,
    id: AlertId,
    status: AlertStatus,
    notes: Option<&str>,
) -> Result<Option<Alert>, sqlx::Error> {
    sqlx::query_as::<_, Alert>(&format!(
        r#"
        UPDATE alerts
        SET status = $2,
            notes = COALESCE($3, notes),
            resolved_at = CASE
                WHEN $2 IN ('resuelta', 'falsa') THEN COALESCE(resolved_at, $4)
                ELSE NULL
            END
        WHERE id = $1
        RETURNING {ALERT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .bind(notes)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
}

/// Clears every assignment held by `user_id`; in-progress alerts return to `activa`.
pub async fn release_alerts_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE alerts
        SET assigned_user_id = NULL,
            status = CASE WHEN status = 'en_proceso' THEN 'activa' ELSE status END
        WHERE assigned_user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
