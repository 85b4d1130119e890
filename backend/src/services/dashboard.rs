//! Builds the per-role dashboard aggregates and notification badges.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::models::dashboard::{
    AdminDashboard, AuditorDashboard, DashboardStats, EmpleadoDashboard, Notification,
};
use crate::models::session::Session;
use crate::models::user::UserRole;
use crate::repositories::{
    activity_log as activity_repo, alert as alert_repo, contact_message as contact_repo,
    dashboard as stats_repo,
};
use crate::types::UserId;

const ADMIN_RECENT_ACTIVITY: i64 = 10;
const ADMIN_RECENT_CONTACT_MESSAGES: i64 = 5;
const AUDITOR_RECENT_ACTIVITY: i64 = 25;

pub async fn admin_dashboard(pool: &PgPool) -> Result<AdminDashboard, sqlx::Error> {
    let since = Utc::now() - Duration::hours(24);
    Ok(AdminDashboard {
        users_by_role: stats_repo::users_by_role(pool).await?,
        users_by_state: stats_repo::users_by_state(pool).await?,
        employees_by_department: stats_repo::employees_by_department(pool).await?,
        alerts_by_status: stats_repo::alerts_by_status(pool).await?,
        average_resolution_hours: stats_repo::average_resolution_hours(pool).await?,
        pending_registrations: stats_repo::pending_registrations(pool).await?,
        contact_messages_last_day: contact_repo::count_contact_messages_since(pool, since).await?,
        recent_contact_messages: contact_repo::recent_contact_messages(
            pool,
            ADMIN_RECENT_CONTACT_MESSAGES,
        )
        .await?,
        recent_activity: activity_repo::recent_activity(pool, ADMIN_RECENT_ACTIVITY).await?,
    })
}

pub async fn empleado_dashboard(
    pool: &PgPool,
    user_id: UserId,
) -> Result<EmpleadoDashboard, sqlx::Error> {
    Ok(EmpleadoDashboard {
        assigned_alerts: alert_repo::list_alerts_assigned_to(pool, user_id).await?,
        available_alerts: alert_repo::list_available_alerts(pool).await?,
        my_alerts_by_status: stats_repo::my_alerts_by_status(pool, user_id).await?,
    })
}

pub async fn auditor_dashboard(pool: &PgPool) -> Result<AuditorDashboard, sqlx::Error> {
    Ok(AuditorDashboard {
        alerts_by_risk: stats_repo::alerts_by_risk(pool).await?,
        alerts_by_status: stats_repo::alerts_by_status(pool).await?,
        resolution_by_risk: stats_repo::resolution_by_risk(pool).await?,
        recent_activity: activity_repo::recent_activity(pool, AUDITOR_RECENT_ACTIVITY).await?,
    })
}

pub async fn stats_for(pool: &PgPool, session: &Session) -> Result<DashboardStats, sqlx::Error> {
    Ok(match session.role {
        UserRole::Admin => DashboardStats::Admin(admin_dashboard(pool).await?),
        UserRole::Empleado => {
            DashboardStats::Empleado(empleado_dashboard(pool, session.user_id).await?)
        }
        UserRole::Auditor => DashboardStats::Auditor(auditor_dashboard(pool).await?),
    })
}

/// Badges for the navigation bar. Entries with a zero count are omitted.
pub async fn notifications_for(
    pool: &PgPool,
    session: &Session,
) -> Result<Vec<Notification>, sqlx::Error> {
    let since = Utc::now() - Duration::hours(24);
    let candidates = match session.role {
        UserRole::Empleado => vec![
            notification(
                "alertas_asignadas",
                "Alertas asignadas en curso",
                stats_repo::open_alerts_assigned_to(pool, session.user_id).await?,
            ),
            notification(
                "alertas_criticas",
                "Alertas críticas sin asignar",
                stats_repo::critical_available_alerts(pool).await?,
            ),
        ],
        UserRole::Admin => vec![
            notification(
                "registros_pendientes",
                "Registros pendientes de aprobación",
                stats_repo::pending_registrations(pool).await?,
            ),
            notification(
                "mensajes_contacto",
                "Mensajes de contacto en las últimas 24 horas",
                contact_repo::count_contact_messages_since(pool, since).await?,
            ),
        ],
        UserRole::Auditor => vec![notification(
            "alertas_resueltas",
            "Alertas cerradas en las últimas 24 horas",
            stats_repo::alerts_resolved_since(pool, since).await?,
        )],
    };

    Ok(candidates.into_iter().filter(|n| n.count > 0).collect())
}

fn notification(kind: &str, message: &str, count: i64) -> Notification {
    Notification {
        kind: kind.to_string(),
        message: message.to_string(),
        count,
    }
}
