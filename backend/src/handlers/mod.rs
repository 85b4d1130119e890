pub mod admin;
pub mod alerts;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod health;
pub mod pages;

use std::str::FromStr;

use serde::Deserialize;

use crate::error::AppError;

/// `?ok=` / `?error=` codes carried across a POST-redirect-GET.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub ok: Option<String>,
    pub error: Option<String>,
}

/// Parses a typed id taken from the URL path.
pub fn parse_id<T: FromStr>(raw: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::BadRequest("Identificador inválido".to_string()))
}

/// Message to show on an HTML page. Internal failures are logged and replaced
/// by the generic text.
pub fn page_message(err: &AppError) -> String {
    if let AppError::InternalServerError(cause) = err {
        tracing::error!(error = ?cause, "Request failed");
    }
    err.user_message()
}
