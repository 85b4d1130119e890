use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use figger_backend::{
    config::Config,
    db::connection::create_pool,
    repositories::{login_attempt, password_reset as password_reset_repo, session as session_repo},
};

/// Login attempts are only consulted inside the lockout window; a day of
/// history is kept for troubleshooting.
const LOGIN_ATTEMPT_RETENTION_HOURS: i64 = 24;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_cleanup=info,figger_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url, 2).await?;

    let deleted_sessions = session_repo::delete_expired_sessions(&pool).await?;
    if deleted_sessions > 0 {
        tracing::info!("Deleted {} expired sessions", deleted_sessions);
    }

    let retention = Duration::hours(
        LOGIN_ATTEMPT_RETENTION_HOURS.max(config.login_lockout_minutes as i64 / 60 + 1),
    );
    let deleted_attempts =
        login_attempt::delete_login_attempts_before(&pool, Utc::now() - retention).await?;
    if deleted_attempts > 0 {
        tracing::info!("Deleted {} old login attempts", deleted_attempts);
    }

    let deleted_tokens = password_reset_repo::purge_spent_reset_tokens(&pool).await?;
    if deleted_tokens > 0 {
        tracing::info!("Deleted {} spent password reset tokens", deleted_tokens);
    }

    for table in ["user_sessions", "login_attempts", "password_resets"] {
        sqlx::query(&format!("VACUUM (ANALYZE) {table}"))
            .execute(pool.as_ref())
            .await?;
    }

    Ok(())
}
