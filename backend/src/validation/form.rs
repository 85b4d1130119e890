//! Declarative field rules evaluated over a flat form map.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::ValidateEmail;

use super::rules::{document_number_pattern, phone_pattern};

/// Submitted fields by name. Missing fields read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    values: HashMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self { values }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Rule {
    MinLength(usize),
    MaxLength(usize),
    Email,
    Phone,
    OneOf(&'static [&'static str]),
    MustEqual {
        field: &'static str,
        label: &'static str,
    },
    Date,
    Decimal,
    MaxValue(f64),
    Identifier,
    DocumentNumber,
}

/// Rules for a single field, checked in declaration order. The first failing
/// rule produces the field's only message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRules {
    required: bool,
    rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.rules.push(Rule::MinLength(min));
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.rules.push(Rule::MaxLength(max));
        self
    }

    pub fn email(mut self) -> Self {
        self.rules.push(Rule::Email);
        self
    }

    pub fn phone(mut self) -> Self {
        self.rules.push(Rule::Phone);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.rules.push(Rule::OneOf(allowed));
        self
    }

    /// The value must equal `field` (labelled `label` in messages).
    pub fn must_equal(mut self, field: &'static str, label: &'static str) -> Self {
        self.rules.push(Rule::MustEqual { field, label });
        self
    }

    /// `YYYY-MM-DD`.
    pub fn date(mut self) -> Self {
        self.rules.push(Rule::Date);
        self
    }

    /// Non-negative decimal number.
    pub fn decimal(mut self) -> Self {
        self.rules.push(Rule::Decimal);
        self
    }

    /// Upper bound for a numeric field; non-numbers are left to [`Self::decimal`].
    pub fn max_value(mut self, max: f64) -> Self {
        self.rules.push(Rule::MaxValue(max));
        self
    }

    /// Reference to another record (UUID).
    pub fn identifier(mut self) -> Self {
        self.rules.push(Rule::Identifier);
        self
    }

    pub fn document_number(mut self) -> Self {
        self.rules.push(Rule::DocumentNumber);
        self
    }

    fn check(&self, label: &str, value: &str, data: &FormData) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return self
                .required
                .then(|| format!("El campo {} es obligatorio", label));
        }

        self.rules
            .iter()
            .find_map(|rule| check_rule(rule, label, value, trimmed, data))
    }
}

fn check_rule(
    rule: &Rule,
    label: &str,
    value: &str,
    trimmed: &str,
    data: &FormData,
) -> Option<String> {
    let length = trimmed.chars().count();
    match rule {
        Rule::MinLength(min) if length < *min => Some(format!(
            "El campo {} debe tener al menos {} caracteres",
            label, min
        )),
        Rule::MaxLength(max) if length > *max => Some(format!(
            "El campo {} no puede superar {} caracteres",
            label, max
        )),
        Rule::Email if !trimmed.validate_email() => Some(format!(
            "El campo {} debe ser un correo electrónico válido",
            label
        )),
        Rule::Phone if !phone_pattern().is_match(trimmed) => Some(format!(
            "El campo {} debe ser un número de teléfono válido",
            label
        )),
        Rule::OneOf(allowed) if !allowed.iter().any(|a| a.eq_ignore_ascii_case(trimmed)) => {
            Some(format!("El campo {} tiene un valor no permitido", label))
        }
        Rule::MustEqual { field, label: other } if value != data.get(field) => {
            Some(format!("El campo {} no coincide con {}", label, other))
        }
        Rule::Date if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_err() => Some(format!(
            "El campo {} debe ser una fecha con formato AAAA-MM-DD",
            label
        )),
        Rule::Decimal
            if !trimmed
                .parse::<f64>()
                .map(|n| n.is_finite() && n >= 0.0)
                .unwrap_or(false) =>
        {
            Some(format!("El campo {} debe ser un número positivo", label))
        }
        Rule::MaxValue(max) if trimmed.parse::<f64>().is_ok_and(|n| n > *max) => Some(format!(
            "El campo {} no puede ser mayor que {}",
            label, max
        )),
        Rule::Identifier if Uuid::parse_str(trimmed).is_err() => {
            Some(format!("El campo {} no es una referencia válida", label))
        }
        Rule::DocumentNumber if !document_number_pattern().is_match(trimmed) => Some(format!(
            "El campo {} debe tener entre 5 y 20 letras o dígitos",
            label
        )),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct FieldSpec {
    name: &'static str,
    label: &'static str,
    rules: FieldRules,
}

/// Ordered set of field rules for one form.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    fields: Vec<FieldSpec>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, label: &'static str, rules: FieldRules) -> Self {
        self.fields.push(FieldSpec { name, label, rules });
        self
    }

    /// Returns one message per invalid field, in declaration order.
    pub fn validate(&self, data: &FormData) -> Vec<String> {
        self.fields
            .iter()
            .filter_map(|field| field.rules.check(field.label, data.get(field.name), data))
            .collect()
    }
}
