#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

//! OpenAPI description of the `/api` surface. Every success body is wrapped in
//! the `{success, message, data}` envelope; the schemas below describe `data`.

use crate::{
    handlers::auth::LoginResponse,
    models::{
        activity_log::ActivityLogView,
        alert::{Alert, AlertStatus, CreateAlert, RiskLevel, UpdateAlertStatus},
        dashboard::{
            AdminDashboard, AuditorDashboard, AverageRow, CountRow, EmpleadoDashboard,
            Notification,
        },
        department::{Department, DepartmentPayload},
        employee::{DocumentType, Employee, EmployeePayload, EmployeeStatus},
        password_reset::{ForgotPasswordRequest, ResetPasswordRequest},
        role::{Role, RolePayload, RoleWithDepartment},
        user::{ChangeRoleRequest, LoginRequest, UserResponse, UserRole},
    },
    services::user_lifecycle::DeletionSummary,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_doc,
        login_doc,
        logout_doc,
        me_doc,
        forgot_password_doc,
        reset_password_doc,
        dashboard_stats_doc,
        notifications_doc,
        list_alerts_doc,
        available_alerts_doc,
        create_alert_doc,
        take_alert_doc,
        update_alert_status_doc,
        admin_list_users_doc,
        admin_activate_user_doc,
        admin_deactivate_user_doc,
        admin_change_role_doc,
        admin_delete_user_doc,
        admin_list_departments_doc,
        admin_create_department_doc,
        admin_update_department_doc,
        admin_delete_department_doc,
        admin_list_roles_doc,
        admin_create_role_doc,
        admin_update_role_doc,
        admin_delete_role_doc,
        admin_list_employees_doc,
        admin_get_employee_doc,
        admin_create_employee_doc,
        admin_update_employee_doc,
        admin_delete_employee_doc
    ),
    components(
        schemas(
            // auth
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UserResponse,
            UserRole,
            ChangeRoleRequest,
            DeletionSummary,
            // alerts
            Alert,
            AlertStatus,
            RiskLevel,
            CreateAlert,
            UpdateAlertStatus,
            // dashboards
            AdminDashboard,
            EmpleadoDashboard,
            AuditorDashboard,
            CountRow,
            AverageRow,
            ActivityLogView,
            Notification,
            // catalog
            Department,
            DepartmentPayload,
            Role,
            RolePayload,
            RoleWithDepartment,
            Employee,
            EmployeePayload,
            DocumentType,
            EmployeeStatus
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Inicio de sesión y recuperación de contraseña"),
        (name = "Dashboard", description = "Estadísticas y notificaciones por rol"),
        (name = "Alerts", description = "Alertas de minería ilegal"),
        (name = "Admin", description = "Usuarios, departamentos, cargos y empleados")
    ),
    security(("BearerAuth" = []), ("SessionCookie" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                crate::utils::cookies::SESSION_COOKIE_NAME,
            ))),
        );
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Servicio y base de datos disponibles", body = serde_json::Value),
        (status = 500, description = "Base de datos no disponible")
    ),
    security(())
)]
fn health_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Sesión iniciada; también fija la cookie de sesión", body = LoginResponse),
        (status = 400, description = "Datos inválidos"),
        (status = 401, description = "Credenciales inválidas o cuenta inactiva"),
        (status = 429, description = "Demasiados intentos fallidos")
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Sesión revocada y cookie eliminada")),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Usuario de la sesión", body = UserResponse)),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Respuesta idéntica exista o no la cuenta")),
    tag = "Auth",
    security(())
)]
fn forgot_password_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Contraseña actualizada; sesiones revocadas"),
        (status = 400, description = "Token inválido, vencido o ya usado")
    ),
    tag = "Auth",
    security(())
)]
fn reset_password_doc() {}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses((
        status = 200,
        description = "Datos del panel del rol de la sesión, etiquetados con `role`",
        body = serde_json::Value
    )),
    tag = "Dashboard"
)]
fn dashboard_stats_doc() {}

#[utoipa::path(
    get,
    path = "/api/dashboard/notifications",
    responses((status = 200, body = [Notification])),
    tag = "Dashboard"
)]
fn notifications_doc() {}

#[utoipa::path(
    get,
    path = "/api/alerts",
    params(("status" = Option<String>, Query, description = "activa | en_proceso | verificada | resuelta | falsa")),
    responses(
        (status = 200, body = [Alert]),
        (status = 400, description = "Estado desconocido")
    ),
    tag = "Alerts"
)]
fn list_alerts_doc() {}

#[utoipa::path(
    get,
    path = "/api/alerts/available",
    responses((status = 200, description = "Activas sin asignar, de mayor a menor riesgo", body = [Alert])),
    tag = "Alerts"
)]
fn available_alerts_doc() {}

#[utoipa::path(
    post,
    path = "/api/alerts",
    request_body = CreateAlert,
    responses(
        (status = 200, body = Alert),
        (status = 400, description = "Datos inválidos"),
        (status = 403, description = "Solo administradores")
    ),
    tag = "Alerts"
)]
fn create_alert_doc() {}

#[utoipa::path(
    post,
    path = "/api/alerts/{id}/take",
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, body = Alert),
        (status = 404, description = "La alerta no existe"),
        (status = 409, description = "La alerta ya fue asignada")
    ),
    tag = "Alerts"
)]
fn take_alert_doc() {}

#[utoipa::path(
    put,
    path = "/api/alerts/{id}/status",
    params(("id" = String, Path, description = "Alert ID")),
    request_body = UpdateAlertStatus,
    responses(
        (status = 200, body = Alert),
        (status = 403, description = "Ni administrador ni empleado asignado"),
        (status = 404, description = "La alerta no existe")
    ),
    tag = "Alerts"
)]
fn update_alert_status_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, body = [UserResponse])),
    tag = "Admin"
)]
fn admin_list_users_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/activate",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, description = "No se permite sobre la propia cuenta"),
        (status = 404, description = "Usuario no encontrado")
    ),
    tag = "Admin"
)]
fn admin_activate_user_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/deactivate",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, description = "No se permite sobre la propia cuenta"),
        (status = 404, description = "Usuario no encontrado")
    ),
    tag = "Admin"
)]
fn admin_deactivate_user_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = String, Path, description = "User ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, body = UserResponse),
        (status = 400, description = "Rol inválido o propia cuenta"),
        (status = 404, description = "Usuario no encontrado")
    ),
    tag = "Admin"
)]
fn admin_change_role_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Alertas liberadas y filas de bitácora afectadas", body = DeletionSummary),
        (status = 400, description = "No se permite sobre la propia cuenta"),
        (status = 404, description = "Usuario no encontrado")
    ),
    tag = "Admin"
)]
fn admin_delete_user_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/departments",
    responses((status = 200, body = [Department])),
    tag = "Admin"
)]
fn admin_list_departments_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/departments",
    request_body = DepartmentPayload,
    responses((status = 200, body = Department), (status = 409, description = "Nombre duplicado")),
    tag = "Admin"
)]
fn admin_create_department_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/departments/{id}",
    params(("id" = String, Path, description = "Department ID")),
    request_body = DepartmentPayload,
    responses((status = 200, body = Department), (status = 404, description = "Departamento no encontrado")),
    tag = "Admin"
)]
fn admin_update_department_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/departments/{id}",
    params(("id" = String, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Departamento eliminado"),
        (status = 404, description = "Departamento no encontrado"),
        (status = 409, description = "Tiene cargos o empleados asociados")
    ),
    tag = "Admin"
)]
fn admin_delete_department_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/roles",
    responses((status = 200, body = [RoleWithDepartment])),
    tag = "Admin"
)]
fn admin_list_roles_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/roles",
    request_body = RolePayload,
    responses((status = 200, body = Role), (status = 400, description = "Departamento inexistente")),
    tag = "Admin"
)]
fn admin_create_role_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    request_body = RolePayload,
    responses((status = 200, body = Role), (status = 404, description = "Cargo no encontrado")),
    tag = "Admin"
)]
fn admin_update_role_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Cargo eliminado"),
        (status = 404, description = "Cargo no encontrado"),
        (status = 409, description = "Tiene empleados asociados")
    ),
    tag = "Admin"
)]
fn admin_delete_role_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses((status = 200, body = [Employee])),
    tag = "Admin"
)]
fn admin_list_employees_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/employees/{id}",
    params(("id" = String, Path, description = "Employee ID")),
    responses((status = 200, body = Employee), (status = 404, description = "Empleado no encontrado")),
    tag = "Admin"
)]
fn admin_get_employee_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = EmployeePayload,
    responses(
        (status = 200, body = Employee),
        (status = 400, description = "Datos inválidos"),
        (status = 409, description = "Documento o correo duplicado")
    ),
    tag = "Admin"
)]
fn admin_create_employee_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/employees/{id}",
    params(("id" = String, Path, description = "Employee ID")),
    request_body = EmployeePayload,
    responses((status = 200, body = Employee), (status = 404, description = "Empleado no encontrado")),
    tag = "Admin"
)]
fn admin_update_employee_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/employees/{id}",
    params(("id" = String, Path, description = "Employee ID")),
    responses((status = 200, description = "Empleado eliminado"), (status = 404, description = "Empleado no encontrado")),
    tag = "Admin"
)]
fn admin_delete_employee_doc() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_api_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/alerts/{id}/take",
            "/api/admin/users/{id}",
            "/api/admin/employees/{id}",
            "/api/dashboard/stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc
            .components
            .as_ref()
            .map(|c| c.security_schemes.clone())
            .unwrap_or_default();
        assert!(schemes.contains_key("BearerAuth"));
        assert!(schemes.contains_key("SessionCookie"));
    }
}
