use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    pub identifier: String,
    pub succeeded: bool,
    pub attempted_at: DateTime<Utc>,
}
