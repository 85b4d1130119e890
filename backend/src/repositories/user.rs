//! Repository functions for portal accounts.

use chrono::Utc;
use sqlx::{PgExecutor, PgPool};

use crate::models::user::{User, UserRole};
use crate::types::UserId;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, active, registered_at, last_login_at";

pub async fn create_user(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, active, registered_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role)
    .bind(user.active)
    .bind(user.registered_at)
    .fetch_one(pool)
    .await
}

pub async fn find_user_by_id(pool: &PgPool, user_id: UserId) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive lookup; emails are stored lower-cased.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY active ASC, registered_at DESC, id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email.trim().to_lowercase())
        .fetch_one(pool)
        .await
}

pub async fn admin_exists(pool: &PgPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')")
        .fetch_one(pool)
        .await
}

pub async fn set_user_active<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
    active: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET active = $2 WHERE id = $1")
        .bind(user_id)
        .bind(active)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_user_role(
    pool: &PgPool,
    user_id: UserId,
    role: UserRole,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_password_hash<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn touch_last_login(pool: &PgPool, user_id: UserId) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: UserId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
