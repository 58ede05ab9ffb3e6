//! Department Repository

use super::{RepoError, RepoResult};
use shared::models::{Department, DepartmentCreate};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Department>> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT id, name, created_at, updated_at FROM departments ORDER BY name COLLATE NOCASE ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(departments)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Department>> {
    let department = sqlx::query_as::<_, Department>(
        "SELECT id, name, created_at, updated_at FROM departments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(department)
}

pub async fn create(pool: &SqlitePool, data: DepartmentCreate) -> RepoResult<Department> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO departments (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create department".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, name: &str) -> RepoResult<Department> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE departments SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Department {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Department {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
