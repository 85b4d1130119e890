use sqlx::PgPool;

use crate::config::Config;
use crate::models::user::{User, UserRole};
use crate::repositories::user as user_repo;
use crate::utils::password::hash_password;

/// Seeds an active administrator when `BOOTSTRAP_ADMIN_PASSWORD` is set and no
/// admin exists yet. Returns the created account, if any.
pub async fn ensure_bootstrap_admin(pool: &PgPool, config: &Config) -> anyhow::Result<Option<User>> {
    let Some(password) = config.bootstrap_admin_password.as_deref() else {
        return Ok(None);
    };
    if user_repo::admin_exists(pool).await? {
        tracing::debug!("Administrator already present, skipping bootstrap");
        return Ok(None);
    }

    let admin = User::new(
        "Administrador".to_string(),
        config.bootstrap_admin_email.clone(),
        hash_password(password)?,
        UserRole::Admin,
        true,
    );
    if user_repo::email_exists(pool, &admin.email).await? {
        anyhow::bail!(
            "Cannot bootstrap admin: {} already belongs to a non-admin account",
            admin.email
        );
    }
    let admin = user_repo::create_user(pool, &admin).await?;
    tracing::info!(user_id = %admin.id, email = %admin.email, "Bootstrap administrator created");
    Ok(Some(admin))
}
