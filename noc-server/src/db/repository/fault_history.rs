//! Fault History Repository (append-only audit log)
//!
//! Insert functions take a generic executor so the lifecycle state machine
//! can record events inside the same transaction as the fault write.

use super::RepoResult;
use shared::models::{FaultHistoryEntry, FaultStatus};
use sqlx::{Executor, Sqlite, SqlitePool};

pub async fn record_status_change<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    fault_id: i64,
    previous_status: FaultStatus,
    new_status: FaultStatus,
    changed_by: i64,
    note: Option<&str>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO fault_history (fault_id, kind, previous_status, new_status, changed_by, note, created_at) VALUES (?, 'status_changed', ?, ?, ?, ?, ?)",
    )
    .bind(fault_id)
    .bind(previous_status)
    .bind(new_status)
    .bind(changed_by)
    .bind(note)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn record_transfer<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    fault_id: i64,
    from_department_id: Option<i64>,
    to_department_id: i64,
    changed_by: i64,
    note: Option<&str>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO fault_history (fault_id, kind, from_department_id, to_department_id, changed_by, note, created_at) VALUES (?, 'transferred', ?, ?, ?, ?, ?)",
    )
    .bind(fault_id)
    .bind(from_department_id)
    .bind(to_department_id)
    .bind(changed_by)
    .bind(note)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

/// Newest-first audit trail with actor usernames and department names.
/// Joins include soft-deleted users so old entries keep their attribution.
pub async fn find_by_fault(pool: &SqlitePool, fault_id: i64) -> RepoResult<Vec<FaultHistoryEntry>> {
    let entries = sqlx::query_as::<_, FaultHistoryEntry>(
        "SELECT h.id, h.fault_id, h.kind, h.previous_status, h.new_status, h.from_department_id, h.to_department_id, h.changed_by, h.note, h.created_at, \
         u.username AS changed_by_username, fd.name AS from_department_name, td.name AS to_department_name \
         FROM fault_history h \
         LEFT JOIN users u ON u.id = h.changed_by \
         LEFT JOIN departments fd ON fd.id = h.from_department_id \
         LEFT JOIN departments td ON td.id = h.to_department_id \
         WHERE h.fault_id = ? ORDER BY h.created_at DESC, h.id DESC",
    )
    .bind(fault_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn count_by_fault(pool: &SqlitePool, fault_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM fault_history WHERE fault_id = ?")
        .bind(fault_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
