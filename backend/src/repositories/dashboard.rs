//! Aggregate queries behind the role dashboards. Each one is an independent
//! auto-committed statement.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use super::alert::RISK_RANK_SQL;
use crate::models::dashboard::{AverageRow, CountRow};
use crate::types::UserId;

const HOURS_TO_RESOLUTION_SQL: &str =
    "AVG(EXTRACT(EPOCH FROM (resolved_at - detected_at)) / 3600.0)::float8";

pub async fn users_by_role(pool: &PgPool) -> Result<Vec<CountRow>, sqlx::Error> {
    sqlx::query_as::<_, CountRow>(
        "SELECT role AS label, COUNT(*) AS total FROM users GROUP BY role ORDER BY role",
    )
    .fetch_all(pool)
    .await
}

pub async fn users_by_state(pool: &PgPool) -> Result<Vec<CountRow>, sqlx::Error> {
    sqlx::query_as::<_, CountRow>(
        r#"
        SELECT CASE WHEN active THEN 'activos' ELSE 'inactivos' END AS label,
               COUNT(*) AS total
        FROM users
        GROUP BY active
        ORDER BY active DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Includes departments without employees.
pub async fn employees_by_department(pool: &PgPool) -> Result<Vec<CountRow>, sqlx::Error> {
    sqlx::query_as::<_, CountRow>(
        r#"
        SELECT d.name AS label, COUNT(e.id) AS total
        FROM departments d
        LEFT JOIN employees e ON e.department_id = d.id
        GROUP BY d.id, d.name
        ORDER BY d.name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn alerts_by_status(pool: &PgPool) -> Result<Vec<CountRow>, sqlx::Error> {
    sqlx::query_as::<_, CountRow>(
        "SELECT status AS label, COUNT(*) AS total FROM alerts GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await
}

pub async fn alerts_by_risk(pool: &PgPool) -> Result<Vec<CountRow>, sqlx::Error> {
    sqlx::query_as::<_, CountRow>(&format!(
        r#"
        SELECT risk_level AS label, COUNT(*) AS total
        FROM alerts
        GROUP BY risk_level
        ORDER BY MAX({RISK_RANK_SQL}) DESC
        "#
    ))
    .fetch_all(pool)
    .await
}

pub async fn my_alerts_by_status(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<CountRow>, sqlx::Error> {
    sqlx::query_as::<_, CountRow>(
        r#"
        SELECT status AS label, COUNT(*) AS total
        FROM alerts
        WHERE assigned_user_id = $1
        GROUP BY status
        ORDER BY status
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// `None` while no alert has been resolved.
pub async fn average_resolution_hours(pool: &PgPool) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<f64>>(&format!(
        "SELECT {HOURS_TO_RESOLUTION_SQL} FROM alerts WHERE resolved_at IS NOT NULL"
    ))
    .fetch_one(pool)
    .await
}

pub async fn resolution_by_risk(pool: &PgPool) -> Result<Vec<AverageRow>, sqlx::Error> {
    sqlx::query_as::<_, AverageRow>(&format!(
        r#"
        SELECT risk_level AS label,
               {HOURS_TO_RESOLUTION_SQL} AS average_hours,
               COUNT(*) AS samples
        FROM alerts
        WHERE resolved_at IS NOT NULL
        GROUP BY risk_level
        ORDER BY MAX({RISK_RANK_SQL}) DESC
        "#
    ))
    .fetch_all(pool)
    .await
}

/// Inactive accounts that never signed in. Accounts an admin deactivated
/// after use are not awaiting approval.
pub async fn pending_registrations<'e, E: PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE NOT active AND last_login_at IS NULL",
    )
    .fetch_one(executor)
    .await
}

pub async fn critical_available_alerts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM alerts
        WHERE assigned_user_id IS NULL AND status = 'activa' AND risk_level = 'critico'
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn open_alerts_assigned_to(pool: &PgPool, user_id: UserId) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM alerts
        WHERE assigned_user_id = $1 AND status NOT IN ('resuelta', 'falsa')
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn alerts_resolved_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alerts WHERE resolved_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await
}
