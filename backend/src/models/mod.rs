//! Data models shared across database access, HTML views and API handlers.

use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope shared by every JSON endpoint: `{success, message, data}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

pub mod activity_log;
pub mod alert;
pub mod contact_message;
pub mod dashboard;
pub mod department;
pub mod employee;
pub mod login_attempt;
pub mod password_reset;
pub mod role;
pub mod session;
pub mod user;
