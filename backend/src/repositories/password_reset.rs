//! Reset tokens are stored as SHA-256 digests; the raw token only travels in
//! the email link.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::types::UserId;

pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub async fn issue_reset_token(
    pool: &PgPool,
    user_id: UserId,
    token: &str,
    ttl: Duration,
) -> Result<(), sqlx::Error> {
    let issued_at = Utc::now();
    sqlx::query(
        "INSERT INTO password_resets (id, user_id, token_hash, expires_at, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(token_digest(token))
    .bind(issued_at + ttl)
    .bind(issued_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Spends a live token in one statement and yields its owner. `None` covers
/// unknown, expired and already used tokens alike, so two concurrent resets
/// with the same link cannot both win.
pub async fn consume_reset_token<'e, E: PgExecutor<'e>>(
    executor: E,
    token: &str,
) -> Result<Option<UserId>, sqlx::Error> {
    sqlx::query_scalar::<_, UserId>(
        "UPDATE password_resets SET used_at = NOW() \
         WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW() \
         RETURNING user_id",
    )
    .bind(token_digest(token))
    .fetch_optional(executor)
    .await
}

pub async fn purge_spent_reset_tokens(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let purged = sqlx::query(
        "DELETE FROM password_resets WHERE used_at IS NOT NULL OR expires_at <= NOW()",
    )
    .execute(pool)
    .await?
    .rows_affected();
    Ok(purged)
}
