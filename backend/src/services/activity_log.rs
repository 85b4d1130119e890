use sqlx::PgPool;

use crate::models::activity_log::ActivityLog;
use crate::repositories::activity_log as activity_repo;
use crate::types::UserId;

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub user_id: UserId,
    pub action: &'static str,
    pub description: String,
    pub ip: Option<String>,
}

impl ActivityEntry {
    pub fn new(user_id: UserId, action: &'static str, description: impl Into<String>) -> Self {
        Self {
            user_id,
            action,
            description: description.into(),
            ip: None,
        }
    }

    pub fn with_ip(mut self, ip: Option<&str>) -> Self {
        self.ip = ip.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ActivityLogService {
    pool: PgPool,
}

impl ActivityLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, entry: ActivityEntry) -> Result<ActivityLog, sqlx::Error> {
        let log = activity_repo::insert_activity_log(
            &self.pool,
            entry.user_id,
            entry.action,
            &entry.description,
            entry.ip.as_deref(),
        )
        .await?;
        tracing::debug!(user_id = %log.user_id, action = %log.action, "Activity recorded");
        Ok(log)
    }

    /// Logging is best effort for actions whose outcome does not depend on it.
    pub async fn record_best_effort(&self, entry: ActivityEntry) {
        let action = entry.action;
        if let Err(err) = self.record(entry).await {
            tracing::warn!(action, error = ?err, "Failed to record activity");
        }
    }

    pub async fn for_user(&self, user_id: UserId) -> Result<Vec<ActivityLog>, sqlx::Error> {
        activity_repo::activity_for_user(&self.pool, user_id).await
    }
}
