use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::DepartmentId;
use crate::validation::{form::FormData, FormInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    #[schema(value_type = String)]
    pub id: DepartmentId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Create/update payload for a department.
pub struct DepartmentPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl FormInput for DepartmentPayload {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
        ])
    }
}
