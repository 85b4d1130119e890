use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::login_attempt::LoginAttempt;

pub async fn record_login_attempt(
    pool: &PgPool,
    identifier: &str,
    ip: Option<&str>,
    succeeded: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO login_attempts (id, identifier, ip, succeeded, attempted_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(identifier)
    .bind(ip)
    .bind(succeeded)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Attempts for `identifier` since `since`, newest first.
pub async fn recent_login_attempts(
    pool: &PgPool,
    identifier: &str,
    since: DateTime<Utc>,
) -> Result<Vec<LoginAttempt>, sqlx::Error> {
    sqlx::query_as::<_, LoginAttempt>(
        r#"
        SELECT identifier, succeeded, attempted_at
        FROM login_attempts
        WHERE identifier = $1 AND attempted_at >= $2
        ORDER BY attempted_at DESC
        "#,
    )
    .bind(identifier)
    .bind(since)
    .fetch_all(pool)
    .await
}

pub async fn delete_login_attempts_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
