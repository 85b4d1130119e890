//! Rule sets shared by every route that accepts the same form.

use std::sync::OnceLock;

use regex::Regex;

use super::form::{FieldRules, FormValidator};
use crate::models::contact_message::INQUIRY_TYPES;

pub const PHONE_PATTERN: &str = r"^\+?[0-9\s\-()]{7,20}$";
const DOCUMENT_NUMBER_PATTERN: &str = r"^[A-Za-z0-9]{5,20}$";

pub const RISK_LEVEL_INPUTS: [&str; 5] = ["bajo", "medio", "alto", "critico", "crítico"];
pub const DOCUMENT_TYPE_INPUTS: [&str; 4] = ["cc", "ce", "ti", "pasaporte"];
pub const EMPLOYEE_STATUS_INPUTS: [&str; 3] = ["activo", "inactivo", "suspendido"];
pub const ROLE_INPUTS: [&str; 3] = ["admin", "empleado", "auditor"];
/// Largest value the `employees.salary NUMERIC(14, 2)` column holds.
pub const MAX_SALARY: f64 = 999_999_999_999.99;

pub fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("valid phone regex"))
}

pub fn document_number_pattern() -> &'static Regex {
    static DOCUMENT: OnceLock<Regex> = OnceLock::new();
    DOCUMENT.get_or_init(|| Regex::new(DOCUMENT_NUMBER_PATTERN).expect("valid document regex"))
}

pub fn login_rules() -> FormValidator {
    FormValidator::new()
        .field(
            "email",
            "correo electrónico",
            FieldRules::new().required().email().max_length(255),
        )
        .field("password", "contraseña", FieldRules::new().required())
}

pub fn registration_rules(password_min_length: usize) -> FormValidator {
    FormValidator::new()
        .field(
            "name",
            "nombre",
            FieldRules::new().required().min_length(3).max_length(120),
        )
        .field(
            "email",
            "correo electrónico",
            FieldRules::new().required().email().max_length(255),
        )
        .field(
            "password",
            "contraseña",
            FieldRules::new()
                .required()
                .min_length(password_min_length)
                .max_length(128),
        )
        .field(
            "password_confirm",
            "confirmación de contraseña",
            FieldRules::new().required().must_equal("password", "contraseña"),
        )
}

pub fn contact_rules() -> FormValidator {
    FormValidator::new()
        .field(
            "name",
            "nombre",
            FieldRules::new().required().min_length(3).max_length(120),
        )
        .field(
            "email",
            "correo electrónico",
            FieldRules::new().required().email().max_length(255),
        )
        .field("phone", "teléfono", FieldRules::new().phone())
        .field(
            "subject",
            "asunto",
            FieldRules::new().required().min_length(5).max_length(200),
        )
        .field(
            "message",
            "mensaje",
            FieldRules::new().required().min_length(10).max_length(5000),
        )
        .field(
            "inquiry_type",
            "tipo de solicitud",
            FieldRules::new().required().one_of(&INQUIRY_TYPES),
        )
}

pub fn department_rules() -> FormValidator {
    FormValidator::new()
        .field(
            "name",
            "nombre",
            FieldRules::new().required().min_length(2).max_length(120),
        )
        .field("description", "descripción", FieldRules::new().max_length(500))
}

pub fn role_rules() -> FormValidator {
    FormValidator::new()
        .field(
            "name",
            "nombre del cargo",
            FieldRules::new().required().min_length(2).max_length(120),
        )
        .field(
            "department_id",
            "departamento",
            FieldRules::new().required().identifier(),
        )
}

pub fn employee_rules() -> FormValidator {
    FormValidator::new()
        .field(
            "document_type",
            "tipo de documento",
            FieldRules::new().required().one_of(&DOCUMENT_TYPE_INPUTS),
        )
        .field(
            "document_number",
            "número de documento",
            FieldRules::new().required().document_number(),
        )
        .field(
            "first_names",
            "nombres",
            FieldRules::new().required().min_length(2).max_length(120),
        )
        .field(
            "last_names",
            "apellidos",
            FieldRules::new().required().min_length(2).max_length(120),
        )
        .field(
            "email",
            "correo electrónico",
            FieldRules::new().required().email().max_length(255),
        )
        .field("phone", "teléfono", FieldRules::new().phone())
        .field(
            "birth_date",
            "fecha de nacimiento",
            FieldRules::new().required().date(),
        )
        .field(
            "salary",
            "salario",
            FieldRules::new().required().decimal().max_value(MAX_SALARY),
        )
        .field(
            "department_id",
            "departamento",
            FieldRules::new().required().identifier(),
        )
        .field("role_id", "cargo", FieldRules::new().required().identifier())
        .field(
            "status",
            "estado",
            FieldRules::new().required().one_of(&EMPLOYEE_STATUS_INPUTS),
        )
}

pub fn alert_rules() -> FormValidator {
    FormValidator::new()
        .field(
            "location",
            "ubicación",
            FieldRules::new().required().min_length(3).max_length(200),
        )
        .field(
            "activity",
            "actividad",
            FieldRules::new().required().min_length(3).max_length(200),
        )
        .field(
            "risk_level",
            "nivel de riesgo",
            FieldRules::new().required().one_of(&RISK_LEVEL_INPUTS),
        )
        .field("notes", "observaciones", FieldRules::new().max_length(2000))
}

pub fn role_change_rules() -> FormValidator {
    FormValidator::new().field(
        "role",
        "rol",
        FieldRules::new().required().one_of(&ROLE_INPUTS),
    )
}

pub fn forgot_password_rules() -> FormValidator {
    FormValidator::new().field(
        "email",
        "correo electrónico",
        FieldRules::new().required().email().max_length(255),
    )
}

pub fn password_reset_rules(password_min_length: usize) -> FormValidator {
    FormValidator::new()
        .field("token", "token", FieldRules::new().required().max_length(128))
        .field(
            "password",
            "contraseña",
            FieldRules::new()
                .required()
                .min_length(password_min_length)
                .max_length(128),
        )
        .field(
            "password_confirm",
            "confirmación de contraseña",
            FieldRules::new().required().must_equal("password", "contraseña"),
        )
}
