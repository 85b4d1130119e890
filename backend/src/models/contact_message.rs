use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::ContactMessageId;
use crate::validation::{form::FormData, sanitize::sanitize_text, FormInput};

/// PQRS categories offered by the public contact form.
pub const INQUIRY_TYPES: [&str; 5] = ["peticion", "queja", "reclamo", "sugerencia", "consulta"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ContactMessage {
    #[schema(value_type = String)]
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub inquiry_type: String,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
/// Raw contact form submission.
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub inquiry_type: String,
}

impl ContactForm {
    /// Trimmed, tag-stripped copy of the submission. Stored values equal these.
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize_text(&self.name),
            email: sanitize_text(&self.email),
            phone: sanitize_text(&self.phone),
            subject: sanitize_text(&self.subject),
            message: sanitize_text(&self.message),
            inquiry_type: sanitize_text(&self.inquiry_type),
        }
    }
}

impl FormInput for ContactForm {
    fn form_data(&self) -> FormData {
        FormData::from_pairs([
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("subject", self.subject.as_str()),
            ("message", self.message.as_str()),
            ("inquiry_type", self.inquiry_type.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_trims_and_strips_tags() {
        let form = ContactForm {
            name: "  <b>Juan</b> Pérez ".into(),
            email: " JUAN@Example.com ".into(),
            phone: " 300 123 4567 ".into(),
            subject: "<script>alert(1)</script>Minería ilegal".into(),
            message: "Hay maquinaria en el río.\n".into(),
            inquiry_type: "Queja".into(),
        };
        let clean = form.sanitized();
        assert_eq!(clean.name, "Juan Pérez");
        assert_eq!(clean.email, "JUAN@Example.com");
        assert_eq!(clean.phone, "300 123 4567");
        assert_eq!(clean.subject, "alert(1)Minería ilegal");
        assert_eq!(clean.message, "Hay maquinaria en el río.");
        assert_eq!(clean.inquiry_type, "Queja");
    }
}
