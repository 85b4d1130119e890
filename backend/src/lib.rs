pub mod client;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod types;
pub mod utils;
pub mod validation;
pub mod views;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    middleware::{
        credential_rate_limiter, log_error_responses, request_id, require_admin,
        require_auditor, require_empleado, require_session, REQUEST_ID_HEADER,
    },
    state::AppState,
};

/// CORS from `CORS_ALLOW_ORIGINS`. A `*` entry opens the API to any origin
/// without credentials; an explicit list allows the session cookie.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let base = CorsLayer::new()
        .allow_methods(methods)
        .max_age(std::time::Duration::from_secs(24 * 60 * 60));

    if config.cors_allow_origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin.trim_end_matches('/')).ok())
        .collect();
    base.allow_origin(origins)
        .allow_credentials(true)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Full application router: HTML pages, JSON API, docs and the shared layers.
///
/// The credential endpoints are rate limited per peer IP, so the service must
/// be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::pages::home))
        .route("/index.php", get(handlers::pages::home))
        .route("/login", get(handlers::pages::login_page))
        .route("/login.php", get(handlers::pages::login_page))
        .route("/views/auth/login.php", get(handlers::pages::login_page))
        .route(
            "/register",
            get(handlers::pages::register_page).post(handlers::pages::register_submit),
        )
        .route(
            "/register.php",
            get(handlers::pages::register_page).post(handlers::pages::register_submit),
        )
        .route(
            "/views/auth/register.php",
            get(handlers::pages::register_page).post(handlers::pages::register_submit),
        )
        .route(
            "/contacto",
            get(handlers::contact::contact_page).post(handlers::contact::contact_submit),
        )
        .route(
            "/contacto.php",
            get(handlers::contact::contact_page).post(handlers::contact::contact_submit),
        )
        .route(
            "/views/public/contacto.php",
            get(handlers::contact::contact_page).post(handlers::contact::contact_submit),
        )
        .route(
            "/restablecer-contrasena",
            get(handlers::pages::reset_password_page),
        )
        .route("/api/health", get(handlers::health::health));

    let credential_routes = Router::new()
        .route("/login", post(handlers::pages::login_submit))
        .route("/login.php", post(handlers::pages::login_submit))
        .route("/views/auth/login.php", post(handlers::pages::login_submit))
        .route(
            "/restablecer-contrasena",
            post(handlers::pages::reset_password_submit),
        )
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/api/auth/reset-password", post(handlers::auth::reset_password))
        .layer(credential_rate_limiter(&state.config));

    let session_routes = Router::new()
        .route(
            "/logout",
            get(handlers::pages::logout).post(handlers::pages::logout),
        )
        .route(
            "/logout.php",
            get(handlers::pages::logout).post(handlers::pages::logout),
        )
        .route(
            "/views/auth/logout.php",
            get(handlers::pages::logout).post(handlers::pages::logout),
        )
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/dashboard/stats", get(handlers::dashboard::stats))
        .route(
            "/api/dashboard/notifications",
            get(handlers::dashboard::notifications),
        )
        .route("/api/alerts", get(handlers::alerts::list_alerts))
        .route(
            "/api/alerts/available",
            get(handlers::alerts::list_available_alerts),
        )
        .route(
            "/api/alerts/{id}/status",
            put(handlers::alerts::update_alert_status),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let admin_routes = Router::new()
        .route("/dashboard/admin", get(handlers::dashboard::admin_page))
        .route("/dashboard_admin.php", get(handlers::dashboard::admin_page))
        .route("/views/dashboard/admin.php", get(handlers::dashboard::admin_page))
        .route("/admin/usuarios", get(handlers::admin::users_page))
        .route("/gestionar_usuarios.php", get(handlers::admin::users_page))
        .route(
            "/views/admin/gestionar_usuarios.php",
            get(handlers::admin::users_page),
        )
        .route(
            "/admin/usuarios/{id}/activar",
            post(handlers::admin::activate_form),
        )
        .route(
            "/admin/usuarios/{id}/desactivar",
            post(handlers::admin::deactivate_form),
        )
        .route(
            "/admin/usuarios/{id}/rol",
            post(handlers::admin::change_role_form),
        )
        .route(
            "/admin/usuarios/{id}/eliminar",
            post(handlers::admin::delete_form),
        )
        .route("/api/alerts", post(handlers::alerts::create_alert))
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route(
            "/api/admin/users/{id}",
            axum::routing::delete(handlers::admin::delete_user),
        )
        .route(
            "/api/admin/users/{id}/activate",
            post(handlers::admin::activate_user),
        )
        .route(
            "/api/admin/users/{id}/deactivate",
            post(handlers::admin::deactivate_user),
        )
        .route(
            "/api/admin/users/{id}/role",
            put(handlers::admin::change_user_role),
        )
        .route(
            "/api/admin/departments",
            get(handlers::admin::list_departments).post(handlers::admin::create_department),
        )
        .route(
            "/api/admin/departments/{id}",
            put(handlers::admin::update_department).delete(handlers::admin::delete_department),
        )
        .route(
            "/api/admin/roles",
            get(handlers::admin::list_roles).post(handlers::admin::create_role),
        )
        .route(
            "/api/admin/roles/{id}",
            put(handlers::admin::update_role).delete(handlers::admin::delete_role),
        )
        .route(
            "/api/admin/employees",
            get(handlers::admin::list_employees).post(handlers::admin::create_employee),
        )
        .route(
            "/api/admin/employees/{id}",
            get(handlers::admin::get_employee)
                .put(handlers::admin::update_employee)
                .delete(handlers::admin::delete_employee),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let empleado_routes = Router::new()
        .route("/dashboard/empleado", get(handlers::dashboard::empleado_page))
        .route(
            "/dashboard_empleado.php",
            get(handlers::dashboard::empleado_page),
        )
        .route(
            "/views/dashboard/empleado.php",
            get(handlers::dashboard::empleado_page),
        )
        .route(
            "/dashboard/empleado/alertas/{id}/tomar",
            post(handlers::dashboard::take_alert_page),
        )
        .route("/api/alerts/{id}/take", post(handlers::alerts::take_alert))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_empleado,
        ));

    let auditor_routes = Router::new()
        .route("/dashboard/auditor", get(handlers::dashboard::auditor_page))
        .route(
            "/dashboard_auditor.php",
            get(handlers::dashboard::auditor_page),
        )
        .route(
            "/views/dashboard/auditor.php",
            get(handlers::dashboard::auditor_page),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auditor,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(credential_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .merge(empleado_routes)
        .merge(auditor_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", docs::ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(log_error_responses))
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::test_config;

    #[test]
    fn explicit_origins_allow_credentials() {
        let mut config = test_config();
        config.cors_allow_origins = vec!["https://portal.figgerenergy.gov.co/".into()];
        let _layer = cors_layer(&config);

        config.cors_allow_origins = vec!["*".into()];
        let _layer = cors_layer(&config);
    }
}
