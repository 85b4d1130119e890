use chrono::Utc;
use sqlx::PgPool;

use crate::models::employee::{Employee, EmployeeInput};
use crate::types::EmployeeId;

const EMPLOYEE_COLUMNS: &str = r#"
    id, document_type, document_number, first_names, last_names, email, phone,
    birth_date, salary::float8 AS salary, department_id, role_id, status,
    created_at, updated_at
"#;

pub async fn list_employees(pool: &PgPool) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY last_names, first_names"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_employee(pool: &PgPool, id: EmployeeId) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_employee(pool: &PgPool, input: &EmployeeInput) -> Result<Employee, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Employee>(&format!(
        r#"
        INSERT INTO employees (
            id, document_type, document_number, first_names, last_names, email, phone,
            birth_date, salary, department_id, role_id, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CAST($9 AS NUMERIC), $10, $11, $12, $13, $13)
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    ))
    .bind(EmployeeId::new())
    .bind(input.document_type)
    .bind(&input.document_number)
    .bind(&input.first_names)
    .bind(&input.last_names)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(input.birth_date)
    .bind(input.salary)
    .bind(input.department_id)
    .bind(input.role_id)
    .bind(input.status)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update_employee(
    pool: &PgPool,
    id: EmployeeId,
    input: &EmployeeInput,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        r#"
        UPDATE employees SET
            document_type = $2, document_number = $3, first_names = $4, last_names = $5,
            email = $6, phone = $7, birth_date = $8, salary = CAST($9 AS NUMERIC),
            department_id = $10, role_id = $11, status = $12, updated_at = $13
        WHERE id = $1
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(input.document_type)
    .bind(&input.document_number)
    .bind(&input.first_names)
    .bind(&input.last_names)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(input.birth_date)
    .bind(input.salary)
    .bind(input.department_id)
    .bind(input.role_id)
    .bind(input.status)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
}

pub async fn delete_employee(pool: &PgPool, id: EmployeeId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
