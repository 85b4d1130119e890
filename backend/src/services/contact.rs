use sqlx::PgPool;

use crate::error::AppError;
use crate::models::contact_message::{ContactForm, ContactMessage};
use crate::repositories::contact_message as contact_repo;
use crate::validation::{rules, validate_input};

/// Sanitises, validates and stores one public contact submission.
///
/// The stored row equals the sanitised form; nothing is written when
/// validation fails.
pub async fn submit_contact_message(
    pool: &PgPool,
    form: &ContactForm,
    ip: Option<&str>,
) -> Result<ContactMessage, AppError> {
    let clean = form.sanitized();
    validate_input(&clean, &rules::contact_rules())?;

    let message = contact_repo::insert_contact_message(pool, &clean, ip).await?;
    tracing::info!(
        contact_message_id = %message.id,
        inquiry_type = %message.inquiry_type,
        "Contact message stored"
    );
    Ok(message)
}
