//! Server-rendered pages.
//!
//! Templates live in `backend/templates/` and are compiled by askama. View
//! structs carry pre-formatted strings so templates stay free of timezone
//! and enum logic.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono_tz::Tz;

use crate::error::GENERIC_ERROR_MESSAGE;
use crate::models::{
    activity_log::ActivityLogView,
    alert::{Alert, AlertStatus, RiskLevel},
    contact_message::{ContactForm, ContactMessage, INQUIRY_TYPES},
    dashboard::{AdminDashboard, AuditorDashboard, AverageRow, CountRow, EmpleadoDashboard},
    session::Session,
    user::{User, UserRole},
};
use crate::utils::time::{format_hours, format_local, format_optional_local};

pub struct HtmlTemplate<T>(pub T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render template: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE).into_response()
            }
        }
    }
}

/// Header navigation; empty for anonymous visitors.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub user_name: Option<String>,
    pub role_label: String,
    pub dashboard_path: String,
    pub is_admin: bool,
}

impl Nav {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_session(session: &Session) -> Self {
        Self {
            user_name: Some(session.name.clone()),
            role_label: session.role.label().to_string(),
            dashboard_path: session.role.dashboard_path().to_string(),
            is_admin: session.role == UserRole::Admin,
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
}

#[derive(Template, Default)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub nav: Nav,
    pub form: ContactForm,
    pub error: Option<String>,
    pub inquiry_types: Vec<InquiryOption>,
}

impl ContactTemplate {
    pub fn new(nav: Nav, form: ContactForm, error: Option<String>) -> Self {
        let inquiry_types = INQUIRY_TYPES
            .iter()
            .map(|value| InquiryOption {
                value: value.to_string(),
                label: inquiry_label(value).to_string(),
                selected: form.inquiry_type.eq_ignore_ascii_case(value),
            })
            .collect();
        Self {
            nav,
            form,
            error,
            inquiry_types,
        }
    }
}

pub struct InquiryOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn inquiry_label(value: &str) -> &'static str {
    match value {
        "peticion" => "Petición",
        "queja" => "Queja",
        "reclamo" => "Reclamo",
        "sugerencia" => "Sugerencia",
        _ => "Consulta",
    }
}

#[derive(Template)]
#[template(path = "contact_sent.html")]
pub struct ContactSentTemplate {
    pub nav: Nav,
    pub name: String,
}

#[derive(Template, Default)]
#[template(path = "reset_password.html")]
pub struct ResetPasswordTemplate {
    pub nav: Nav,
    pub token: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub nav: Nav,
    pub message: String,
}

pub struct AlertRow {
    pub id: String,
    pub location: String,
    pub activity: String,
    pub risk: String,
    pub risk_class: String,
    pub status: String,
    pub detected: String,
    pub resolved: String,
}

impl AlertRow {
    fn from_alert(alert: &Alert, tz: &Tz) -> Self {
        Self {
            id: alert.id.to_string(),
            location: alert.location.clone(),
            activity: alert.activity.clone(),
            risk: alert.risk_level.label().to_string(),
            risk_class: alert.risk_level.as_str().to_string(),
            status: alert.status.label().to_string(),
            detected: format_local(&alert.detected_at, tz),
            resolved: format_optional_local(alert.resolved_at.as_ref(), tz),
        }
    }
}

pub struct ActivityRow {
    pub when: String,
    pub user: String,
    pub action: String,
    pub description: String,
    pub ip: String,
}

impl ActivityRow {
    fn from_view(entry: &ActivityLogView, tz: &Tz) -> Self {
        Self {
            when: format_local(&entry.created_at, tz),
            user: entry
                .user_name
                .clone()
                .unwrap_or_else(|| entry.user_id.to_string()),
            action: entry.action.clone(),
            description: entry.description.clone(),
            ip: entry.ip.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub struct ContactRow {
    pub when: String,
    pub name: String,
    pub email: String,
    pub inquiry_type: String,
    pub subject: String,
}

impl ContactRow {
    fn from_message(message: &ContactMessage, tz: &Tz) -> Self {
        Self {
            when: format_local(&message.created_at, tz),
            name: message.name.clone(),
            email: message.email.clone(),
            inquiry_type: message.inquiry_type.clone(),
            subject: message.subject.clone(),
        }
    }
}

/// A `CountRow` with its raw enum value replaced by the display label.
pub struct CountLine {
    pub label: String,
    pub total: i64,
}

fn count_lines(rows: &[CountRow], label: impl Fn(&str) -> Option<&'static str>) -> Vec<CountLine> {
    rows.iter()
        .map(|row| CountLine {
            label: label(&row.label)
                .map(str::to_string)
                .unwrap_or_else(|| row.label.clone()),
            total: row.total,
        })
        .collect()
}

fn status_label(raw: &str) -> Option<&'static str> {
    AlertStatus::parse(raw).map(|status| status.label())
}

fn risk_label(raw: &str) -> Option<&'static str> {
    RiskLevel::parse(raw).map(|risk| risk.label())
}

fn role_label(raw: &str) -> Option<&'static str> {
    UserRole::parse(raw).map(|role| role.label())
}

pub struct AverageLine {
    pub label: String,
    pub hours: String,
    pub samples: i64,
}

#[derive(Template)]
#[template(path = "dashboard_admin.html")]
pub struct AdminDashboardTemplate {
    pub nav: Nav,
    pub users_by_role: Vec<CountLine>,
    pub users_by_state: Vec<CountLine>,
    pub employees_by_department: Vec<CountLine>,
    pub alerts_by_status: Vec<CountLine>,
    pub average_resolution: String,
    pub pending_registrations: i64,
    pub contact_messages_last_day: i64,
    pub recent_contact_messages: Vec<ContactRow>,
    pub recent_activity: Vec<ActivityRow>,
}

impl AdminDashboardTemplate {
    pub fn new(nav: Nav, data: &AdminDashboard, tz: &Tz) -> Self {
        Self {
            nav,
            users_by_role: count_lines(&data.users_by_role, role_label),
            users_by_state: count_lines(&data.users_by_state, |_| None),
            employees_by_department: count_lines(&data.employees_by_department, |_| None),
            alerts_by_status: count_lines(&data.alerts_by_status, status_label),
            average_resolution: format_hours(data.average_resolution_hours),
            pending_registrations: data.pending_registrations,
            contact_messages_last_day: data.contact_messages_last_day,
            recent_contact_messages: data
                .recent_contact_messages
                .iter()
                .map(|message| ContactRow::from_message(message, tz))
                .collect(),
            recent_activity: data
                .recent_activity
                .iter()
                .map(|entry| ActivityRow::from_view(entry, tz))
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard_empleado.html")]
pub struct EmpleadoDashboardTemplate {
    pub nav: Nav,
    pub assigned_alerts: Vec<AlertRow>,
    pub available_alerts: Vec<AlertRow>,
    pub my_alerts_by_status: Vec<CountLine>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl EmpleadoDashboardTemplate {
    pub fn new(nav: Nav, data: &EmpleadoDashboard, tz: &Tz) -> Self {
        Self {
            nav,
            notice: None,
            error: None,
            assigned_alerts: data
                .assigned_alerts
                .iter()
                .map(|alert| AlertRow::from_alert(alert, tz))
                .collect(),
            available_alerts: data
                .available_alerts
                .iter()
                .map(|alert| AlertRow::from_alert(alert, tz))
                .collect(),
            my_alerts_by_status: count_lines(&data.my_alerts_by_status, status_label),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard_auditor.html")]
pub struct AuditorDashboardTemplate {
    pub nav: Nav,
    pub alerts_by_risk: Vec<CountLine>,
    pub alerts_by_status: Vec<CountLine>,
    pub resolution_by_risk: Vec<AverageLine>,
    pub recent_activity: Vec<ActivityRow>,
}

impl AuditorDashboardTemplate {
    pub fn new(nav: Nav, data: &AuditorDashboard, tz: &Tz) -> Self {
        Self {
            nav,
            alerts_by_risk: count_lines(&data.alerts_by_risk, risk_label),
            alerts_by_status: count_lines(&data.alerts_by_status, status_label),
            resolution_by_risk: data.resolution_by_risk.iter().map(average_line).collect(),
            recent_activity: data
                .recent_activity
                .iter()
                .map(|entry| ActivityRow::from_view(entry, tz))
                .collect(),
        }
    }
}

fn average_line(row: &AverageRow) -> AverageLine {
    AverageLine {
        label: risk_label(&row.label)
            .map(str::to_string)
            .unwrap_or_else(|| row.label.clone()),
        hours: format_hours(row.average_hours),
        samples: row.samples,
    }
}

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub role_label: String,
    pub active: bool,
    pub registered: String,
    pub last_login: String,
    pub is_self: bool,
}

pub struct RoleOption {
    pub value: String,
    pub label: String,
}

#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct UsersTemplate {
    pub nav: Nav,
    pub users: Vec<UserRow>,
    pub roles: Vec<RoleOption>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl UsersTemplate {
    pub fn new(
        nav: Nav,
        users: &[User],
        actor: &Session,
        tz: &Tz,
        notice: Option<String>,
        error: Option<String>,
    ) -> Self {
        let users = users
            .iter()
            .map(|user| UserRow {
                id: user.id.to_string(),
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role.as_str().to_string(),
                role_label: user.role.label().to_string(),
                active: user.active,
                registered: format_local(&user.registered_at, tz),
                last_login: format_optional_local(user.last_login_at.as_ref(), tz),
                is_self: user.id == actor.user_id,
            })
            .collect();
        let roles = UserRole::ALL
            .iter()
            .map(|role| RoleOption {
                value: role.as_str().to_string(),
                label: role.label().to_string(),
            })
            .collect();
        Self {
            nav,
            users,
            roles,
            notice,
            error,
        }
    }
}
