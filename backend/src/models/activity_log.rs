use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{ActivityLogId, UserId};

/// Marker appended to a deleted user's log descriptions under the annotate policy.
pub const DELETED_USER_MARKER: &str = "[usuario eliminado]";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Append-only record of something a user did.
pub struct ActivityLog {
    #[schema(value_type = String)]
    pub id: ActivityLogId,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub action: String,
    pub description: String,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Log row joined with the acting user's name; `user_name` is `None` once the
/// account is gone.
pub struct ActivityLogView {
    #[schema(value_type = String)]
    pub id: ActivityLogId,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub action: String,
    pub description: String,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Action identifiers written to `activity_logs.action`.
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const REGISTER: &str = "register";
    pub const PASSWORD_RESET_REQUESTED: &str = "password_reset_requested";
    pub const PASSWORD_RESET: &str = "password_reset";
    pub const USER_ACTIVATED: &str = "user_activated";
    pub const USER_DEACTIVATED: &str = "user_deactivated";
    pub const USER_ROLE_CHANGED: &str = "user_role_changed";
    pub const USER_DELETED: &str = "user_deleted";
    pub const ALERT_CREATED: &str = "alert_created";
    pub const ALERT_TAKEN: &str = "alert_taken";
    pub const ALERT_STATUS_CHANGED: &str = "alert_status_changed";
    pub const DEPARTMENT_CHANGED: &str = "department_changed";
    pub const ROLE_CHANGED: &str = "role_changed";
    pub const EMPLOYEE_CHANGED: &str = "employee_changed";
}
