//! Server-side session rows backing the signed session cookie.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::session::UserSession;
use crate::types::{SessionId, UserId};

pub async fn create_session(
    pool: &PgPool,
    user_id: UserId,
    jti: &str,
    ip: Option<&str>,
    user_agent: Option<&str>,
    expires_at: DateTime<Utc>,
) -> Result<UserSession, sqlx::Error> {
    sqlx::query_as::<_, UserSession>(
        r#"
        INSERT INTO user_sessions (id, user_id, jti, ip, user_agent, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, jti, ip, user_agent, created_at, expires_at
        "#,
    )
    .bind(SessionId::new())
    .bind(user_id)
    .bind(jti)
    .bind(ip)
    .bind(user_agent)
    .bind(Utc::now())
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Returns the session only while it has not expired.
pub async fn find_active_session(
    pool: &PgPool,
    jti: &str,
) -> Result<Option<UserSession>, sqlx::Error> {
    sqlx::query_as::<_, UserSession>(
        r#"
        SELECT id, user_id, jti, ip, user_agent, created_at, expires_at
        FROM user_sessions
        WHERE jti = $1 AND expires_at > $2
        "#,
    )
    .bind(jti)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
}

pub async fn delete_session(pool: &PgPool, jti: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_sessions WHERE jti = $1")
        .bind(jti)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_sessions_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_expired_sessions(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= $1")
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
