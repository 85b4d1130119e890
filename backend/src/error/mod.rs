use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

pub const GENERIC_ERROR_MESSAGE: &str = "Ocurrió un error, intente de nuevo";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    BadRequest(String),
    TooManyRequests { message: String, retry_after: u64 },
    InternalServerError(anyhow::Error),
    Validation(Vec<String>),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to an end user on an HTML page.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::TooManyRequests { message, .. } => message.clone(),
            AppError::Validation(errors) => errors.join("; "),
            AppError::InternalServerError(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut retry_after = None;
        let (message, code, details) = match self {
            AppError::NotFound(msg) => (msg, "NOT_FOUND", None),
            AppError::Unauthorized(msg) => (msg, "UNAUTHORIZED", None),
            AppError::Forbidden(msg) => (msg, "FORBIDDEN", None),
            AppError::Conflict(msg) => (msg, "CONFLICT", None),
            AppError::BadRequest(msg) => (msg, "BAD_REQUEST", None),
            AppError::TooManyRequests {
                message,
                retry_after: seconds,
            } => {
                retry_after = Some(seconds);
                (
                    message,
                    "TOO_MANY_REQUESTS",
                    Some(serde_json::json!({ "retry_after": seconds })),
                )
            }
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    GENERIC_ERROR_MESSAGE.to_string(),
                    "INTERNAL_SERVER_ERROR",
                    None,
                )
            }
            AppError::Validation(errors) => (
                "Los datos enviados no son válidos".to_string(),
                "VALIDATION_ERROR",
                Some(serde_json::json!({ "errors": errors })),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: code.to_string(),
            details,
        });

        let mut response = (status, body).into_response();
        if let Some(seconds) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Registro no encontrado".to_string()),
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict("El registro ya existe".to_string())
            }
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23503") => {
                AppError::Conflict("El registro está en uso".to_string())
            }
            _ => AppError::InternalServerError(err.into()),
        }
    }
}
