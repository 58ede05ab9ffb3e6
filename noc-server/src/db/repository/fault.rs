//! Fault Repository
//!
//! List reads join department/customer/user references in one query; the
//! dynamic filter set is compiled with `QueryBuilder`. Writes go through
//! [`apply_write`], which checks and increments the `version` column so a
//! concurrent writer loses with a conflict instead of silently winning.

use super::{RepoError, RepoResult};
use shared::models::{Fault, FaultCreate, FaultGeneralCreate, FaultStatus, FaultWithRefs, Severity};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, ticket_number, description, type, location, owner, status, severity, pending_hours, resolved_at, closed_at, resolved_by, closed_by, customer_id, assigned_to_id, general_type, general_reference, version, created_at, updated_at";

const REF_SELECT: &str = "SELECT f.id, f.ticket_number, f.description, f.type, f.location, f.owner, f.status, f.severity, f.pending_hours, f.resolved_at, f.closed_at, f.resolved_by, f.closed_by, f.customer_id, f.assigned_to_id, f.general_type, f.general_reference, f.version, f.created_at, f.updated_at, \
    d.name AS department_name, \
    c.company AS customer_company, c.circuit_id AS customer_circuit_id, c.location AS customer_location, c.ip_address AS customer_ip_address, c.pop_site AS customer_pop_site, \
    ru.username AS resolved_by_username, cu.username AS closed_by_username \
    FROM faults f \
    LEFT JOIN departments d ON d.id = f.assigned_to_id \
    LEFT JOIN customers c ON c.id = f.customer_id \
    LEFT JOIN users ru ON ru.id = f.resolved_by \
    LEFT JOIN users cu ON cu.id = f.closed_by";

/// Store-level filter set for fault list reads.
///
/// `search` matches ticket number, description and type by substring;
/// `search_customer_ids` is the pre-expanded customer sub-search OR'd into
/// the same predicate. Severity is not here: it is derived for active
/// faults and filtered after enrichment.
#[derive(Debug, Clone, Default)]
pub struct FaultListFilter {
    pub status: Option<FaultStatus>,
    pub department_id: Option<i64>,
    pub search: Option<String>,
    pub search_customer_ids: Vec<i64>,
    /// [start, end) on `created_at`, both Unix millis.
    pub window: Option<(i64, i64)>,
}

/// Field-level write set applied by [`apply_write`]. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct FaultWrite {
    pub ticket_number: Option<String>,
    pub description: Option<String>,
    pub fault_type: Option<String>,
    pub location: Option<String>,
    pub owner: Option<String>,
    pub customer_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
    pub status: Option<FaultStatus>,
    pub severity: Option<Severity>,
    pub pending_hours: Option<f64>,
    pub resolved_at: Option<i64>,
    pub resolved_by: Option<i64>,
    pub closed_at: Option<i64>,
    pub closed_by: Option<i64>,
}

pub async fn find_by_id<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Fault>> {
    let fault =
        sqlx::query_as::<_, Fault>(&format!("SELECT {COLUMNS} FROM faults WHERE id = ?"))
            .bind(id)
            .fetch_optional(exec)
            .await?;
    Ok(fault)
}

pub async fn find_with_refs_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<FaultWithRefs>> {
    let fault = sqlx::query_as::<_, FaultWithRefs>(&format!("{REF_SELECT} WHERE f.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(fault)
}

/// Filtered list with references, newest created first.
pub async fn find_with_refs(
    pool: &SqlitePool,
    filter: &FaultListFilter,
) -> RepoResult<Vec<FaultWithRefs>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(REF_SELECT);
    qb.push(" WHERE 1=1");

    if let Some(status) = filter.status {
        qb.push(" AND f.status = ").push_bind(status);
    }
    if let Some(dept) = filter.department_id {
        qb.push(" AND f.assigned_to_id = ").push_bind(dept);
    }
    if let Some((start, end)) = filter.window {
        qb.push(" AND f.created_at >= ").push_bind(start);
        qb.push(" AND f.created_at < ").push_bind(end);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (f.ticket_number LIKE ").push_bind(pattern.clone());
        qb.push(" OR f.description LIKE ").push_bind(pattern.clone());
        qb.push(" OR f.type LIKE ").push_bind(pattern);
        if !filter.search_customer_ids.is_empty() {
            qb.push(" OR f.customer_id IN (");
            let mut sep = qb.separated(", ");
            for id in &filter.search_customer_ids {
                sep.push_bind(*id);
            }
            qb.push(")");
        }
        qb.push(")");
    }

    qb.push(" ORDER BY f.created_at DESC, f.id DESC");

    let faults = qb.build_query_as::<FaultWithRefs>().fetch_all(pool).await?;
    Ok(faults)
}

/// Faults raised against one customer, newest first.
pub async fn find_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<FaultWithRefs>> {
    let faults = sqlx::query_as::<_, FaultWithRefs>(&format!(
        "{REF_SELECT} WHERE f.customer_id = ? ORDER BY f.created_at DESC, f.id DESC"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(faults)
}

pub async fn create(
    pool: &SqlitePool,
    data: &FaultCreate,
    severity: Severity,
) -> RepoResult<Fault> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO faults (ticket_number, description, type, location, owner, status, severity, pending_hours, customer_id, assigned_to_id, version, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?) RETURNING id",
    )
    .bind(&data.ticket_number)
    .bind(&data.description)
    .bind(&data.fault_type)
    .bind(&data.location)
    .bind(&data.owner)
    .bind(data.status)
    .bind(severity)
    .bind(data.pending_hours)
    .bind(data.customer_id)
    .bind(data.assigned_to_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create fault".into()))
}

pub async fn create_general(
    pool: &SqlitePool,
    data: &FaultGeneralCreate,
    severity: Severity,
) -> RepoResult<Fault> {
    let now = shared::util::now_millis();
    let status = data.status.unwrap_or(FaultStatus::Open);
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO faults (description, type, location, owner, status, severity, general_type, general_reference, assigned_to_id, version, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?) RETURNING id",
    )
    .bind(&data.description)
    .bind(&data.fault_type)
    .bind(&data.location)
    .bind(&data.owner)
    .bind(status)
    .bind(severity)
    .bind(&data.general_type)
    .bind(&data.general_reference)
    .bind(data.assigned_to_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create fault".into()))
}

/// Check-and-increment write. The update only lands if the stored version
/// still equals `expected_version`; otherwise another writer got there
/// first and the caller sees a conflict.
pub async fn apply_write<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    id: i64,
    expected_version: i64,
    write: &FaultWrite,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE faults SET \
         ticket_number = COALESCE(?, ticket_number), \
         description = COALESCE(?, description), \
         type = COALESCE(?, type), \
         location = COALESCE(?, location), \
         owner = COALESCE(?, owner), \
         customer_id = COALESCE(?, customer_id), \
         assigned_to_id = COALESCE(?, assigned_to_id), \
         status = COALESCE(?, status), \
         severity = COALESCE(?, severity), \
         pending_hours = COALESCE(?, pending_hours), \
         resolved_at = COALESCE(?, resolved_at), \
         resolved_by = COALESCE(?, resolved_by), \
         closed_at = COALESCE(?, closed_at), \
         closed_by = COALESCE(?, closed_by), \
         version = version + 1, \
         updated_at = ? \
         WHERE id = ? AND version = ?",
    )
    .bind(&write.ticket_number)
    .bind(&write.description)
    .bind(&write.fault_type)
    .bind(&write.location)
    .bind(&write.owner)
    .bind(write.customer_id)
    .bind(write.assigned_to_id)
    .bind(write.status)
    .bind(write.severity)
    .bind(write.pending_hours)
    .bind(write.resolved_at)
    .bind(write.resolved_by)
    .bind(write.closed_at)
    .bind(write.closed_by)
    .bind(now)
    .bind(id)
    .bind(expected_version)
    .execute(exec)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(format!(
            "Fault {id} was modified concurrently"
        )));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM faults WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Store-level aggregation (department dashboards) ─────────────────

/// Status counts grouped in SQL, optionally scoped to one department.
pub async fn count_by_status(
    pool: &SqlitePool,
    department_id: Option<i64>,
) -> RepoResult<Vec<(FaultStatus, i64)>> {
    let rows = if let Some(dept) = department_id {
        sqlx::query_as::<_, (FaultStatus, i64)>(
            "SELECT status, COUNT(*) FROM faults WHERE assigned_to_id = ? GROUP BY status",
        )
        .bind(dept)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, (FaultStatus, i64)>(
            "SELECT status, COUNT(*) FROM faults GROUP BY status",
        )
        .fetch_all(pool)
        .await?
    };
    Ok(rows)
}

/// Daily created counts since `start_ms`, grouped at the store level by
/// date-truncating the millisecond timestamp. Returns (YYYY-MM-DD, count).
pub async fn daily_created_counts(
    pool: &SqlitePool,
    department_id: Option<i64>,
    start_ms: i64,
) -> RepoResult<Vec<(String, i64)>> {
    let rows = if let Some(dept) = department_id {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT DATE(created_at / 1000, 'unixepoch') AS day, COUNT(*) FROM faults WHERE assigned_to_id = ? AND created_at >= ? GROUP BY day ORDER BY day ASC",
        )
        .bind(dept)
        .bind(start_ms)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT DATE(created_at / 1000, 'unixepoch') AS day, COUNT(*) FROM faults WHERE created_at >= ? GROUP BY day ORDER BY day ASC",
        )
        .bind(start_ms)
        .fetch_all(pool)
        .await?
    };
    Ok(rows)
}

/// Active (non-terminal) faults for a department; feeds the live severity
/// breakdown on the department charts.
pub async fn find_active_for_department(
    pool: &SqlitePool,
    department_id: i64,
) -> RepoResult<Vec<Fault>> {
    let faults = sqlx::query_as::<_, Fault>(&format!(
        "SELECT {COLUMNS} FROM faults WHERE assigned_to_id = ? AND status IN ('Open', 'In Progress') ORDER BY created_at DESC"
    ))
    .bind(department_id)
    .fetch_all(pool)
    .await?;
    Ok(faults)
}
