use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;

/// Outgoing mail seam. SMTP in production, log-only when no SMTP host is set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &Config, host: &str) -> Result<Self> {
        let transport = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                    .port(config.smtp_port)
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .build()
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(config.smtp_port)
                .build(),
        };

        Ok(Self {
            transport,
            from_address: config.mail_from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(email).await?;
        Ok(())
    }
}

/// Writes the message metadata to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(to, subject, body_len = body.len(), "SMTP not configured, mail not sent");
        Ok(())
    }
}

pub fn mailer_from_config(config: &Config) -> Result<Arc<dyn Mailer>> {
    match &config.smtp_host {
        Some(host) => Ok(Arc::new(SmtpMailer::new(config, host)?)),
        None => Ok(Arc::new(LogMailer)),
    }
}

pub fn password_reset_message(base_url: &str, token: &str, valid_minutes: u64) -> (String, String) {
    let reset_url = format!(
        "{}/restablecer-contrasena?token={}",
        base_url.trim_end_matches('/'),
        token
    );
    let body = format!(
        r#"
Recibimos una solicitud para restablecer su contraseña del portal Figger Energy.

Use el siguiente enlace para definir una nueva contraseña:

{}

El enlace es válido durante {} minutos. Si usted no hizo esta solicitud, ignore este mensaje.

---
Figger Energy - Portal institucional
"#,
        reset_url, valid_minutes
    );

    (
        "Restablecimiento de contraseña - Figger Energy".to_string(),
        body,
    )
}
