//! Admin CRUD for departments, job roles and employee records.

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::parse_id,
    models::{
        activity_log::actions,
        department::{Department, DepartmentPayload},
        employee::{Employee, EmployeeInput, EmployeePayload},
        role::{Role, RolePayload, RoleWithDepartment},
        session::Session,
        ApiResponse,
    },
    repositories::{
        department as department_repo, employee as employee_repo, role as role_repo,
    },
    services::activity_log::{ActivityEntry, ActivityLogService},
    state::AppState,
    types::{DepartmentId, EmployeeId, RoleId},
    utils::request_meta::RequestMeta,
    validation::{rules, sanitize::sanitize_text, validate_input},
};

async fn audit(
    pool: &PgPool,
    session: &Session,
    meta: &RequestMeta,
    action: &'static str,
    description: String,
) {
    ActivityLogService::new(pool.clone())
        .record_best_effort(ActivityEntry::new(session.user_id, action, description).with_ip(meta.ip()))
        .await;
}

fn not_found(what: &str) -> AppError {
    AppError::NotFound(format!("{what} no encontrado"))
}

fn ensure_deleted(rows: u64, what: &str) -> Result<(), AppError> {
    if rows == 0 {
        return Err(not_found(what));
    }
    Ok(())
}

// Departments

fn clean_department(payload: &DepartmentPayload) -> Result<DepartmentPayload, AppError> {
    let clean = DepartmentPayload {
        name: sanitize_text(&payload.name),
        description: sanitize_text(&payload.description),
    };
    validate_input(&clean, &rules::department_rules())?;
    Ok(clean)
}

pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Department>>>, AppError> {
    let departments = department_repo::list_departments(&state.pool).await?;
    Ok(Json(ApiResponse::ok("Departamentos", departments)))
}

pub async fn create_department(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    meta: RequestMeta,
    Json(payload): Json<DepartmentPayload>,
) -> Result<Json<ApiResponse<Department>>, AppError> {
    let clean = clean_department(&payload)?;
    let department =
        department_repo::create_department(&state.pool, &clean.name, &clean.description).await?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::DEPARTMENT_CHANGED,
        format!("Creó el departamento {}", department.name),
    )
    .await;
    Ok(Json(ApiResponse::ok("Departamento creado", department)))
}

pub async fn update_department(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
    Json(payload): Json<DepartmentPayload>,
) -> Result<Json<ApiResponse<Department>>, AppError> {
    let id = parse_id::<DepartmentId>(&id)?;
    let clean = clean_department(&payload)?;
    let department =
        department_repo::update_department(&state.pool, id, &clean.name, &clean.description)
            .await?
            .ok_or_else(|| not_found("Departamento"))?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::DEPARTMENT_CHANGED,
        format!("Actualizó el departamento {}", department.name),
    )
    .await;
    Ok(Json(ApiResponse::ok("Departamento actualizado", department)))
}

pub async fn delete_department(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_id::<DepartmentId>(&id)?;
    ensure_deleted(
        department_repo::delete_department(&state.pool, id).await?,
        "Departamento",
    )?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::DEPARTMENT_CHANGED,
        format!("Eliminó el departamento {id}"),
    )
    .await;
    Ok(Json(ApiResponse::ok("Departamento eliminado", ())))
}

// Roles

async fn clean_role(pool: &PgPool, payload: &RolePayload) -> Result<(String, DepartmentId), AppError> {
    let clean = RolePayload {
        name: sanitize_text(&payload.name),
        department_id: payload.department_id.trim().to_string(),
    };
    validate_input(&clean, &rules::role_rules())?;
    let department_id = parse_id::<DepartmentId>(&clean.department_id)?;
    if department_repo::find_department(pool, department_id).await?.is_none() {
        return Err(AppError::Validation(vec![
            "El departamento seleccionado no existe".to_string(),
        ]));
    }
    Ok((clean.name, department_id))
}

pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoleWithDepartment>>>, AppError> {
    let roles = role_repo::list_roles(&state.pool).await?;
    Ok(Json(ApiResponse::ok("Cargos", roles)))
}

pub async fn create_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    meta: RequestMeta,
    Json(payload): Json<RolePayload>,
) -> Result<Json<ApiResponse<Role>>, AppError> {
    let (name, department_id) = clean_role(&state.pool, &payload).await?;
    let role = role_repo::create_role(&state.pool, &name, department_id).await?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::ROLE_CHANGED,
        format!("Creó el cargo {}", role.name),
    )
    .await;
    Ok(Json(ApiResponse::ok("Cargo creado", role)))
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
    Json(payload): Json<RolePayload>,
) -> Result<Json<ApiResponse<Role>>, AppError> {
    let id = parse_id::<RoleId>(&id)?;
    let (name, department_id) = clean_role(&state.pool, &payload).await?;
    let role = role_repo::update_role(&state.pool, id, &name, department_id)
        .await?
        .ok_or_else(|| not_found("Cargo"))?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::ROLE_CHANGED,
        format!("Actualizó el cargo {}", role.name),
    )
    .await;
    Ok(Json(ApiResponse::ok("Cargo actualizado", role)))
}

pub async fn delete_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_id::<RoleId>(&id)?;
    ensure_deleted(role_repo::delete_role(&state.pool, id).await?, "Cargo")?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::ROLE_CHANGED,
        format!("Eliminó el cargo {id}"),
    )
    .await;
    Ok(Json(ApiResponse::ok("Cargo eliminado", ())))
}

// Employees

fn clean_employee(payload: &EmployeePayload) -> Result<EmployeeInput, AppError> {
    let clean = payload.sanitized();
    validate_input(&clean, &rules::employee_rules())?;
    clean
        .to_input()
        .ok_or_else(|| AppError::Validation(vec!["Los datos del empleado no son válidos".to_string()]))
}

async fn employee_input(pool: &PgPool, payload: &EmployeePayload) -> Result<EmployeeInput, AppError> {
    let input = clean_employee(payload)?;

    let role = role_repo::find_role(pool, input.role_id).await?;
    match role {
        None => Err(AppError::Validation(vec![
            "El cargo seleccionado no existe".to_string(),
        ])),
        Some(role) if role.department_id != input.department_id => Err(AppError::Validation(vec![
            "El cargo no pertenece al departamento seleccionado".to_string(),
        ])),
        Some(_) => Ok(input),
    }
}

pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Employee>>>, AppError> {
    let employees = employee_repo::list_employees(&state.pool).await?;
    Ok(Json(ApiResponse::ok("Empleados", employees)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Employee>>, AppError> {
    let id = parse_id::<EmployeeId>(&id)?;
    let employee = employee_repo::find_employee(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Empleado"))?;
    Ok(Json(ApiResponse::ok("Empleado", employee)))
}

pub async fn create_employee(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    meta: RequestMeta,
    Json(payload): Json<EmployeePayload>,
) -> Result<Json<ApiResponse<Employee>>, AppError> {
    let input = employee_input(&state.pool, &payload).await?;
    let employee = employee_repo::create_employee(&state.pool, &input).await?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::EMPLOYEE_CHANGED,
        format!(
            "Registró al empleado {} {}",
            employee.first_names, employee.last_names
        ),
    )
    .await;
    Ok(Json(ApiResponse::ok("Empleado registrado", employee)))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
    Json(payload): Json<EmployeePayload>,
) -> Result<Json<ApiResponse<Employee>>, AppError> {
    let id = parse_id::<EmployeeId>(&id)?;
    let input = employee_input(&state.pool, &payload).await?;
    let employee = employee_repo::update_employee(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Empleado"))?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::EMPLOYEE_CHANGED,
        format!(
            "Actualizó al empleado {} {}",
            employee.first_names, employee.last_names
        ),
    )
    .await;
    Ok(Json(ApiResponse::ok("Empleado actualizado", employee)))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    meta: RequestMeta,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_id::<EmployeeId>(&id)?;
    ensure_deleted(employee_repo::delete_employee(&state.pool, id).await?, "Empleado")?;
    audit(
        &state.pool,
        &session,
        &meta,
        actions::EMPLOYEE_CHANGED,
        format!("Eliminó al empleado {id}"),
    )
    .await;
    Ok(Json(ApiResponse::ok("Empleado eliminado", ())))
}
