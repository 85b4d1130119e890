//! Server-side sessions and the request-scoped view of the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::{User, UserRole};
use crate::types::{SessionId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Row backing a signed session cookie; deleting it revokes the cookie.
pub struct UserSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub jti: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated caller, resolved once per request by the auth gate and
/// handed to handlers through request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub jti: String,
}

impl Session {
    pub fn from_user(user: &User, jti: impl Into<String>) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            jti: jti.into(),
        }
    }
}
