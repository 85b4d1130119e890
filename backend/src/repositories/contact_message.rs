use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::contact_message::{ContactForm, ContactMessage};
use crate::types::ContactMessageId;

/// Stores an already sanitised and validated submission.
pub async fn insert_contact_message(
    pool: &PgPool,
    form: &ContactForm,
    ip: Option<&str>,
) -> Result<ContactMessage, sqlx::Error> {
    let phone = (!form.phone.is_empty()).then_some(form.phone.as_str());

    sqlx::query_as::<_, ContactMessage>(
        r#"
        INSERT INTO contact_messages (id, name, email, phone, subject, message, inquiry_type, ip, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, name, email, phone, subject, message, inquiry_type, ip, created_at
        "#,
    )
    .bind(ContactMessageId::new())
    .bind(&form.name)
    .bind(&form.email)
    .bind(phone)
    .bind(&form.subject)
    .bind(&form.message)
    .bind(&form.inquiry_type)
    .bind(ip)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn recent_contact_messages(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ContactMessage>, sqlx::Error> {
    sqlx::query_as::<_, ContactMessage>(
        r#"
        SELECT id, name, email, phone, subject, message, inquiry_type, ip, created_at
        FROM contact_messages
        ORDER BY created_at DESC, id
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count_contact_messages_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_messages WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await
}
