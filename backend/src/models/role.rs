//! Job roles (cargos) inside a department. Not to be confused with
//! [`crate::models::user::UserRole`], which controls portal permissions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{DepartmentId, RoleId};
use crate::validation::{form::FormData, FormInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    #[schema(value_type = String)]
    pub id: RoleId,
    pub name: String,
    #[schema(value_type = String)]
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Role row joined with its department name for listings.
pub struct RoleWithDepartment {
    #[schema(value_type = String)]
    pub id: RoleId,
    pub name: String,
    #[schema(value_type = String)]
    pub department_id: DepartmentId,
    pub department_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RolePayload {
    pub name: String,
    pub department_id: String,
}

impl FormInput for RolePayload {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([
            ("name", self.name.as_str()),
            ("department_id", self.department_id.as_str()),
        ])
    }
}
