use sqlx::PgPool;

use crate::models::role::{Role, RoleWithDepartment};
use crate::types::{DepartmentId, RoleId};

pub async fn list_roles(pool: &PgPool) -> Result<Vec<RoleWithDepartment>, sqlx::Error> {
    sqlx::query_as::<_, RoleWithDepartment>(
        r#"
        SELECT r.id, r.name, r.department_id, d.name AS department_name
        FROM roles r
        INNER JOIN departments d ON d.id = r.department_id
        ORDER BY d.name, r.name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_role(pool: &PgPool, id: RoleId) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT id, name, department_id FROM roles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_role(
    pool: &PgPool,
    name: &str,
    department_id: DepartmentId,
) -> Result<Role, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        r#"
        INSERT INTO roles (id, name, department_id)
        VALUES ($1, $2, $3)
        RETURNING id, name, department_id
        "#,
    )
    .bind(RoleId::new())
    .bind(name)
    .bind(department_id)
    .fetch_one(pool)
    .await
}

pub async fn update_role(
    pool: &PgPool,
    id: RoleId,
    name: &str,
    department_id: DepartmentId,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        r#"
        UPDATE roles SET name = $2, department_id = $3
        WHERE id = $1
        RETURNING id, name, department_id
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(department_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_role(pool: &PgPool, id: RoleId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
