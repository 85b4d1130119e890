//! Employee records managed by administrators.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{DepartmentId, EmployeeId, RoleId};
use crate::validation::{form::FormData, sanitize::sanitize_text, FormInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Cédula de ciudadanía.
    Cc,
    /// Cédula de extranjería.
    Ce,
    /// Tarjeta de identidad.
    Ti,
    Pasaporte,
}

impl DocumentType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cc" => Some(DocumentType::Cc),
            "ce" => Some(DocumentType::Ce),
            "ti" => Some(DocumentType::Ti),
            "pasaporte" | "pa" => Some(DocumentType::Pasaporte),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Activo,
    Inactivo,
    Suspendido,
}

impl EmployeeStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "activo" => Some(EmployeeStatus::Activo),
            "inactivo" => Some(EmployeeStatus::Inactivo),
            "suspendido" => Some(EmployeeStatus::Suspendido),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    #[schema(value_type = String)]
    pub id: EmployeeId,
    pub document_type: DocumentType,
    pub document_number: String,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub salary: f64,
    #[schema(value_type = String)]
    pub department_id: DepartmentId,
    #[schema(value_type = String)]
    pub role_id: RoleId,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Create/update payload. Free text arrives as strings so the shared form
/// rules can report every problem at once.
pub struct EmployeePayload {
    pub document_type: String,
    pub document_number: String,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub salary: String,
    pub department_id: String,
    pub role_id: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "activo".to_string()
}

impl FormInput for EmployeePayload {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([
            ("document_type", self.document_type.as_str()),
            ("document_number", self.document_number.as_str()),
            ("first_names", self.first_names.as_str()),
            ("last_names", self.last_names.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("birth_date", self.birth_date.as_str()),
            ("salary", self.salary.as_str()),
            ("department_id", self.department_id.as_str()),
            ("role_id", self.role_id.as_str()),
            ("status", self.status.as_str()),
        ])
    }
}

/// Parsed, typed form of [`EmployeePayload`] ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeInput {
    pub document_type: DocumentType,
    pub document_number: String,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub salary: f64,
    pub department_id: DepartmentId,
    pub role_id: RoleId,
    pub status: EmployeeStatus,
}

impl EmployeePayload {
    /// Trimmed, tag-stripped copy. Validation runs on this, not on the raw body.
    pub fn sanitized(&self) -> Self {
        Self {
            document_type: self.document_type.trim().to_string(),
            document_number: sanitize_text(&self.document_number),
            first_names: sanitize_text(&self.first_names),
            last_names: sanitize_text(&self.last_names),
            email: sanitize_text(&self.email),
            phone: sanitize_text(&self.phone),
            birth_date: self.birth_date.trim().to_string(),
            salary: self.salary.trim().to_string(),
            department_id: self.department_id.trim().to_string(),
            role_id: self.role_id.trim().to_string(),
            status: self.status.trim().to_string(),
        }
    }

    /// Converts a sanitised, validated payload into typed values.
    pub fn to_input(&self) -> Option<EmployeeInput> {
        Some(EmployeeInput {
            document_type: DocumentType::parse(&self.document_type)?,
            document_number: self.document_number.to_uppercase(),
            first_names: self.first_names.clone(),
            last_names: self.last_names.clone(),
            email: self.email.to_lowercase(),
            phone: (!self.phone.is_empty()).then(|| self.phone.clone()),
            birth_date: match self.birth_date.trim() {
                "" => None,
                raw => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?),
            },
            salary: self.salary.trim().parse().ok()?,
            department_id: self.department_id.parse().ok()?,
            role_id: self.role_id.parse().ok()?,
            status: EmployeeStatus::parse(&self.status)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_accepts_known_codes() {
        assert_eq!(DocumentType::parse("CC"), Some(DocumentType::Cc));
        assert_eq!(DocumentType::parse("pa"), Some(DocumentType::Pasaporte));
        assert_eq!(DocumentType::parse("nit"), None);
    }

    #[test]
    fn employee_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(EmployeeStatus::Suspendido).unwrap(),
            serde_json::Value::String("suspendido".into())
        );
        assert_eq!(EmployeeStatus::parse("Inactivo"), Some(EmployeeStatus::Inactivo));
    }

    #[test]
    fn payload_defaults_status_to_activo() {
        let payload: EmployeePayload = serde_json::from_value(serde_json::json!({
            "document_type": "cc",
            "document_number": "1020304050",
            "first_names": "María",
            "last_names": "Gómez",
            "email": "maria@figgerenergy.gov.co",
            "department_id": "d",
            "role_id": "r"
        }))
        .unwrap();
        assert_eq!(payload.status, "activo");
        assert_eq!(payload.phone, "");
    }

    #[test]
    fn to_input_parses_typed_fields() {
        let payload = EmployeePayload {
            document_type: "CC".into(),
            document_number: "ab12345".into(),
            first_names: " <b>María</b> ".into(),
            last_names: "Gómez".into(),
            email: "Maria@FiggerEnergy.gov.co".into(),
            phone: "".into(),
            birth_date: "1990-05-17".into(),
            salary: "3500000.50".into(),
            department_id: "6f1c2f0e-5d4b-4a9e-9c8d-2b1a0f3e4d5c".into(),
            role_id: "0b7a3c1e-2f4d-4e6a-8b9c-1d2e3f4a5b6c".into(),
            status: "activo".into(),
        };
        let input = payload.sanitized().to_input().unwrap();
        assert_eq!(input.document_type, DocumentType::Cc);
        assert_eq!(input.document_number, "AB12345");
        assert_eq!(input.first_names, "María");
        assert_eq!(input.email, "maria@figgerenergy.gov.co");
        assert_eq!(input.phone, None);
        assert_eq!(input.salary, 3500000.50);
    }
}
