//! Fault Note Repository (append-only)

use super::{RepoError, RepoResult};
use shared::models::FaultNote;
use sqlx::SqlitePool;

pub async fn find_by_fault(pool: &SqlitePool, fault_id: i64) -> RepoResult<Vec<FaultNote>> {
    let notes = sqlx::query_as::<_, FaultNote>(
        "SELECT id, fault_id, content, created_by, department_id, created_at FROM fault_notes WHERE fault_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(fault_id)
    .fetch_all(pool)
    .await?;
    Ok(notes)
}

pub async fn create(
    pool: &SqlitePool,
    fault_id: i64,
    content: &str,
    created_by: i64,
    department_id: Option<i64>,
) -> RepoResult<FaultNote> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO fault_notes (fault_id, content, created_by, department_id, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(fault_id)
    .bind(content)
    .bind(created_by)
    .bind(department_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let note = sqlx::query_as::<_, FaultNote>(
        "SELECT id, fault_id, content, created_by, department_id, created_at FROM fault_notes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    note.ok_or_else(|| RepoError::Database("Failed to create fault note".into()))
}
