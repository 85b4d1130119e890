use sqlx::PgPool;

use crate::models::department::Department;
use crate::types::DepartmentId;

pub async fn list_departments(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>("SELECT id, name, description FROM departments ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn find_department(
    pool: &PgPool,
    id: DepartmentId,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>("SELECT id, name, description FROM departments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_department(
    pool: &PgPool,
    name: &str,
    description: &str,
) -> Result<Department, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        r#"
        INSERT INTO departments (id, name, description)
        VALUES ($1, $2, $3)
        RETURNING id, name, description
        "#,
    )
    .bind(DepartmentId::new())
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update_department(
    pool: &PgPool,
    id: DepartmentId,
    name: &str,
    description: &str,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        r#"
        UPDATE departments SET name = $2, description = $3
        WHERE id = $1
        RETURNING id, name, description
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await
}

/// Fails with a foreign-key violation while roles or employees reference it.
pub async fn delete_department(pool: &PgPool, id: DepartmentId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM departments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
