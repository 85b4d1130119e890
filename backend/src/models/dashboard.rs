//! Aggregates shown on the role dashboards.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{activity_log::ActivityLogView, alert::Alert, contact_message::ContactMessage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
/// One `GROUP BY` bucket.
pub struct CountRow {
    pub label: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AverageRow {
    pub label: String,
    pub average_hours: Option<f64>,
    pub samples: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDashboard {
    pub users_by_role: Vec<CountRow>,
    pub users_by_state: Vec<CountRow>,
    pub employees_by_department: Vec<CountRow>,
    pub alerts_by_status: Vec<CountRow>,
    pub average_resolution_hours: Option<f64>,
    pub pending_registrations: i64,
    pub contact_messages_last_day: i64,
    pub recent_contact_messages: Vec<ContactMessage>,
    pub recent_activity: Vec<ActivityLogView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmpleadoDashboard {
    pub assigned_alerts: Vec<Alert>,
    pub available_alerts: Vec<Alert>,
    pub my_alerts_by_status: Vec<CountRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditorDashboard {
    pub alerts_by_risk: Vec<CountRow>,
    pub alerts_by_status: Vec<CountRow>,
    pub resolution_by_risk: Vec<AverageRow>,
    pub recent_activity: Vec<ActivityLogView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardStats {
    Admin(AdminDashboard),
    Empleado(EmpleadoDashboard),
    Auditor(AuditorDashboard),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub kind: String,
    pub message: String,
    pub count: i64,
}
