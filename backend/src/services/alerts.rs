//! Alert mutations with their ownership rules and activity logging.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::activity_log::actions;
use crate::models::alert::{Alert, AlertStatus, CreateAlert, RiskLevel, UpdateAlertStatus};
use crate::models::session::Session;
use crate::models::user::UserRole;
use crate::repositories::alert as alert_repo;
use crate::services::activity_log::{ActivityEntry, ActivityLogService};
use crate::types::AlertId;
use crate::validation::{rules, sanitize::sanitize_text, validate_input};

pub const ALERT_NOT_FOUND: &str = "La alerta no existe";
pub const ALERT_UNAVAILABLE: &str = "La alerta ya fue asignada o no está disponible";

pub async fn create_alert(
    pool: &PgPool,
    actor: &Session,
    payload: &CreateAlert,
    ip: Option<&str>,
) -> Result<Alert, AppError> {
    let clean = CreateAlert {
        location: sanitize_text(&payload.location),
        activity: sanitize_text(&payload.activity),
        risk_level: sanitize_text(&payload.risk_level),
        notes: sanitize_text(&payload.notes),
    };
    validate_input(&clean, &rules::alert_rules())?;
    let risk_level = RiskLevel::parse(&clean.risk_level)
        .ok_or_else(|| AppError::Validation(vec!["Nivel de riesgo inválido".to_string()]))?;

    let alert = alert_repo::create_alert(
        pool,
        &Alert::new(clean.location, clean.activity, risk_level, clean.notes),
    )
    .await?;

    ActivityLogService::new(pool.clone())
        .record(
            ActivityEntry::new(
                actor.user_id,
                actions::ALERT_CREATED,
                format!(
                    "Registró la alerta {} en {} (riesgo {})",
                    alert.id,
                    alert.location,
                    alert.risk_level.as_str()
                ),
            )
            .with_ip(ip),
        )
        .await?;
    Ok(alert)
}

/// Assigns an available alert to the calling empleado.
pub async fn take_alert(
    pool: &PgPool,
    actor: &Session,
    id: AlertId,
    ip: Option<&str>,
) -> Result<Alert, AppError> {
    if actor.role != UserRole::Empleado {
        return Err(AppError::Forbidden(
            "Solo los empleados pueden tomar alertas".to_string(),
        ));
    }

    let Some(alert) = alert_repo::take_alert(pool, id, actor.user_id).await? else {
        return match alert_repo::find_alert(pool, id).await? {
            Some(_) => Err(AppError::Conflict(ALERT_UNAVAILABLE.to_string())),
            None => Err(AppError::NotFound(ALERT_NOT_FOUND.to_string())),
        };
    };

    ActivityLogService::new(pool.clone())
        .record(
            ActivityEntry::new(
                actor.user_id,
                actions::ALERT_TAKEN,
                format!("Tomó la alerta {} en {}", alert.id, alert.location),
            )
            .with_ip(ip),
        )
        .await?;
    Ok(alert)
}

/// Admins may move any alert; an empleado only the ones assigned to them.
pub fn can_update_status(actor: &Session, alert: &Alert) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Empleado => alert.assigned_user_id == Some(actor.user_id),
        UserRole::Auditor => false,
    }
}

pub async fn update_status(
    pool: &PgPool,
    actor: &Session,
    id: AlertId,
    payload: &UpdateAlertStatus,
    ip: Option<&str>,
) -> Result<Alert, AppError> {
    let current = alert_repo::find_alert(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(ALERT_NOT_FOUND.to_string()))?;
    if !can_update_status(actor, &current) {
        return Err(AppError::Forbidden(
            "No puede modificar el estado de esta alerta".to_string(),
        ));
    }

    let notes = payload.notes.as_deref().map(sanitize_text);
    if notes.as_ref().is_some_and(|n| n.chars().count() > 2000) {
        return Err(AppError::Validation(vec![
            "El campo observaciones no puede superar 2000 caracteres".to_string(),
        ]));
    }

    let alert = alert_repo::update_alert_status(pool, id, payload.status, notes.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(ALERT_NOT_FOUND.to_string()))?;

    ActivityLogService::new(pool.clone())
        .record(
            ActivityEntry::new(
                actor.user_id,
                actions::ALERT_STATUS_CHANGED,
                format!(
                    "Cambió la alerta {} de {} a {}",
                    alert.id,
                    current.status.as_str(),
                    alert.status.as_str()
                ),
            )
            .with_ip(ip),
        )
        .await?;
    Ok(alert)
}

/// Parses the optional `?status=` filter; an empty value means "all".
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<AlertStatus>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => AlertStatus::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Estado de alerta desconocido: {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;

    fn session(role: UserRole) -> Session {
        Session {
            user_id: UserId::new(),
            email: "x@figgerenergy.gov.co".into(),
            name: "X".into(),
            role,
            jti: "jti".into(),
        }
    }

    #[test]
    fn only_admin_or_assignee_may_change_status() {
        let admin = session(UserRole::Admin);
        let empleado = session(UserRole::Empleado);
        let auditor = session(UserRole::Auditor);
        let mut alert = Alert::new("Río Cauca".into(), "Dragado".into(), RiskLevel::Alto, String::new());

        assert!(can_update_status(&admin, &alert));
        assert!(!can_update_status(&empleado, &alert));
        assert!(!can_update_status(&auditor, &alert));

        alert.assigned_user_id = Some(empleado.user_id);
        assert!(can_update_status(&empleado, &alert));
        assert!(!can_update_status(&auditor, &alert));
    }

    #[test]
    fn status_filter_accepts_aliases_and_blank() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("investigando")).unwrap(),
            Some(AlertStatus::EnProceso)
        );
        assert!(matches!(
            parse_status_filter(Some("cerrada")),
            Err(AppError::BadRequest(_))
        ));
    }
}
