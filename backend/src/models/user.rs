//! Models that represent portal accounts, authentication payloads and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::UserId;
use crate::validation::{form::FormData, FormInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a portal account.
pub struct User {
    #[schema(value_type = String)]
    pub id: UserId,
    pub name: String,
    /// Unique, stored lower-cased.
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    /// Inactive accounts cannot log in.
    pub active: bool,
    pub registered_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
/// The three portal roles; each one owns a dashboard.
pub enum UserRole {
    Admin,
    #[default]
    Empleado,
    Auditor,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Empleado, UserRole::Auditor];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Empleado => "empleado",
            UserRole::Auditor => "auditor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::Empleado => "Empleado",
            UserRole::Auditor => "Auditor",
        }
    }

    /// Landing route after login.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Admin => "/dashboard/admin",
            UserRole::Empleado => "/dashboard/empleado",
            UserRole::Auditor => "/dashboard/auditor",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrador" => Some(UserRole::Admin),
            "empleado" | "employee" => Some(UserRole::Empleado),
            "auditor" => Some(UserRole::Auditor),
            _ => None,
        }
    }
}

impl User {
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        role: UserRole,
        active: bool,
    ) -> Self {
        Self {
            id: UserId::new(),
            name,
            email: email.trim().to_lowercase(),
            password_hash,
            role,
            active,
            registered_at: Utc::now(),
            last_login_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of an account.
pub struct UserResponse {
    #[schema(value_type = String)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
            registered_at: user.registered_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Credentials submitted by the login form or the JSON login endpoint.
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl FormInput for LoginRequest {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([("email", self.email.as_str()), ("password", self.password.as_str())])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Self-service registration form.
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl FormInput for RegisterRequest {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("password_confirm", self.password_confirm.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Admin request to change an account's role. Used by the JSON API and the
/// user management form alike.
pub struct ChangeRoleRequest {
    #[serde(default)]
    pub role: String,
}

impl FormInput for ChangeRoleRequest {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([("role", self.role.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn user_role_serde_uses_spanish_snake_case() {
        let e: UserRole = serde_json::from_str("\"empleado\"").unwrap();
        assert_eq!(e, UserRole::Empleado);
        assert_eq!(
            serde_json::to_value(UserRole::Auditor).unwrap(),
            Value::String("auditor".into())
        );
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }

    #[test]
    fn user_role_parse_is_lenient_on_case_and_aliases() {
        assert_eq!(UserRole::parse(" ADMIN "), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("employee"), Some(UserRole::Empleado));
        assert_eq!(UserRole::parse("guest"), None);
    }

    #[test]
    fn each_role_has_its_own_dashboard() {
        assert_eq!(UserRole::Admin.dashboard_path(), "/dashboard/admin");
        assert_eq!(UserRole::Empleado.dashboard_path(), "/dashboard/empleado");
        assert_eq!(UserRole::Auditor.dashboard_path(), "/dashboard/auditor");
    }

    #[test]
    fn new_user_normalizes_email() {
        let user = User::new(
            "Luis".into(),
            "  Luis@FiggerEnergy.gov.co ".into(),
            "hash".into(),
            UserRole::Empleado,
            false,
        );
        assert_eq!(user.email, "luis@figgerenergy.gov.co");
        assert!(!user.active);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User::new(
            "Ana".into(),
            "ana@x.co".into(),
            "secret-hash".into(),
            UserRole::Admin,
            true,
        );
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
