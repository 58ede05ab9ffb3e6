//! Fault Lifecycle State Machine
//!
//! Governs status transitions, terminal timestamps and audit history.
//! Every mutation runs in one SQLite transaction: the fault write, the
//! history row and the version increment land together or not at all.
//!
//! Transition rules are an explicit, named policy. The current product
//! decision is [`TransitionPolicy::Unrestricted`]: any status may move to
//! any other, so Closed faults can be reopened.

use shared::models::{Fault, FaultStatus, FaultTransfer, FaultUpdate};
use shared::util::{millis_to_hours, now_millis, round1};
use sqlx::SqlitePool;

use super::severity::classify_severity;
use crate::db::repository::fault::FaultWrite;
use crate::db::repository::{RepoError, RepoResult, fault, fault_history};

/// Named transition policy for the 4-state lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may move to any other status, including reopening a
    /// Resolved or Closed fault.
    Unrestricted,
}

impl TransitionPolicy {
    /// The policy in force for all lifecycle operations.
    pub const fn current() -> Self {
        TransitionPolicy::Unrestricted
    }

    pub fn allows(&self, _from: FaultStatus, _to: FaultStatus) -> bool {
        match self {
            TransitionPolicy::Unrestricted => true,
        }
    }
}

/// Apply a general fault update. A supplied `status` that differs from
/// the stored one triggers a status transition; a supplied
/// `department_id` (or `assigned_to_id`) that differs triggers a
/// transfer. Both side effects are audited.
pub async fn update_fault(
    pool: &SqlitePool,
    id: i64,
    actor_id: i64,
    data: FaultUpdate,
) -> RepoResult<Fault> {
    let mut tx = pool.begin().await?;

    let current = fault::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Fault {id} not found")))?;

    if let Some(expected) = data.expected_version
        && expected != current.version
    {
        return Err(RepoError::Conflict(format!(
            "Fault {id} version is stale (expected {expected}, stored {})",
            current.version
        )));
    }

    let mut write = FaultWrite {
        description: data.description,
        fault_type: data.fault_type,
        location: data.location,
        owner: data.owner,
        customer_id: data.customer_id,
        pending_hours: data.pending_hours,
        ..FaultWrite::default()
    };

    // Department transfer: the dedicated field wins, the plain
    // assignment field is treated identically so reassignment is never
    // silently unaudited.
    let target_department = data.department_id.or(data.assigned_to_id);
    let transfer_to = match target_department {
        Some(dept) if Some(dept) != current.assigned_to_id => {
            ensure_department_exists(&mut tx, dept).await?;
            write.assigned_to_id = Some(dept);
            Some(dept)
        }
        _ => None,
    };

    let now = now_millis();
    let transition = match data.status {
        Some(new_status) if new_status != current.status => {
            let policy = TransitionPolicy::current();
            if !policy.allows(current.status, new_status) {
                return Err(RepoError::Validation(format!(
                    "Transition {} -> {} is not allowed",
                    current.status, new_status
                )));
            }
            write.status = Some(new_status);
            apply_terminal_snapshot(&mut write, &current, new_status, actor_id, now);
            Some((current.status, new_status))
        }
        _ => None,
    };

    fault::apply_write(&mut *tx, id, current.version, &write).await?;

    if let Some((previous, new)) = transition {
        fault_history::record_status_change(
            &mut *tx,
            id,
            previous,
            new,
            actor_id,
            data.note.as_deref(),
        )
        .await?;
    }
    if let Some(dept) = transfer_to {
        fault_history::record_transfer(
            &mut *tx,
            id,
            current.assigned_to_id,
            dept,
            actor_id,
            data.note.as_deref(),
        )
        .await?;
    }

    let updated = fault::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::Database("Fault vanished mid-update".into()))?;
    tx.commit().await?;
    Ok(updated)
}

/// Dedicated transfer operation: reassign the owning department and
/// append one `transferred` audit row, atomically.
pub async fn transfer_fault(
    pool: &SqlitePool,
    id: i64,
    actor_id: i64,
    data: FaultTransfer,
) -> RepoResult<Fault> {
    let mut tx = pool.begin().await?;

    let current = fault::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Fault {id} not found")))?;

    if let Some(expected) = data.expected_version
        && expected != current.version
    {
        return Err(RepoError::Conflict(format!(
            "Fault {id} version is stale (expected {expected}, stored {})",
            current.version
        )));
    }

    ensure_department_exists(&mut tx, data.department_id).await?;

    let write = FaultWrite {
        assigned_to_id: Some(data.department_id),
        ..FaultWrite::default()
    };
    fault::apply_write(&mut *tx, id, current.version, &write).await?;

    fault_history::record_transfer(
        &mut *tx,
        id,
        current.assigned_to_id,
        data.department_id,
        actor_id,
        data.note.as_deref(),
    )
    .await?;

    let updated = fault::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::Database("Fault vanished mid-transfer".into()))?;
    tx.commit().await?;
    Ok(updated)
}

/// First entry into Resolved/Closed stamps the terminal timestamp, the
/// acting user and the frozen severity/pending-hours snapshot. Re-entry
/// leaves the original snapshot untouched.
fn apply_terminal_snapshot(
    write: &mut FaultWrite,
    current: &Fault,
    new_status: FaultStatus,
    actor_id: i64,
    now: i64,
) {
    let snapshot = |write: &mut FaultWrite| {
        let hours = round1(millis_to_hours((now - current.created_at).max(0)));
        write.pending_hours = Some(hours);
        write.severity = Some(classify_severity(hours));
    };

    match new_status {
        FaultStatus::Resolved if current.resolved_at.is_none() => {
            write.resolved_at = Some(now);
            write.resolved_by = Some(actor_id);
            snapshot(write);
        }
        FaultStatus::Closed if current.closed_at.is_none() => {
            write.closed_at = Some(now);
            write.closed_by = Some(actor_id);
            snapshot(write);
        }
        _ => {}
    }
}

async fn ensure_department_exists(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    department_id: i64,
) -> RepoResult<()> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments WHERE id = ?")
        .bind(department_id)
        .fetch_one(&mut **tx)
        .await?;
    if count == 0 {
        return Err(RepoError::Validation(format!(
            "Department {department_id} does not exist"
        )));
    }
    Ok(())
}
