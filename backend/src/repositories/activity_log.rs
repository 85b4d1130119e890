//! Activity log persistence. Rows are only appended, except for the
//! deleted-user retention step run inside the user deletion transaction.

use chrono::Utc;
use sqlx::{PgExecutor, PgPool};

use crate::models::activity_log::{ActivityLog, ActivityLogView, DELETED_USER_MARKER};
use crate::types::{ActivityLogId, UserId};

pub async fn insert_activity_log<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
    action: &str,
    description: &str,
    ip: Option<&str>,
) -> Result<ActivityLog, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(
        r#"
        INSERT INTO activity_logs (id, user_id, action, description, ip, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, action, description, ip, created_at
        "#,
    )
    .bind(ActivityLogId::new())
    .bind(user_id)
    .bind(action)
    .bind(description)
    .bind(ip)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

/// Newest first, joined with the author's current name.
pub async fn recent_activity(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLogView>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLogView>(
        r#"
        SELECT l.id, l.user_id, u.name AS user_name, l.action, l.description, l.ip, l.created_at
        FROM activity_logs l
        LEFT JOIN users u ON u.id = l.user_id
        ORDER BY l.created_at DESC, l.id
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn activity_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<ActivityLog>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT id, user_id, action, description, ip, created_at
        FROM activity_logs
        WHERE user_id = $1
        ORDER BY created_at DESC, id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Appends the deleted-user marker to the user's rows that do not carry it yet.
pub async fn annotate_deleted_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE activity_logs
        SET description = CASE
                WHEN description = '' THEN $2
                ELSE description || ' ' || $2
            END
        WHERE user_id = $1
          AND position($2 IN description) = 0
        "#,
    )
    .bind(user_id)
    .bind(DELETED_USER_MARKER)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn purge_user_activity<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM activity_logs WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
