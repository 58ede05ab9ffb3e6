//! Fault audit history (append-only, tagged event log).
//!
//! Status changes and department transfers are distinct event kinds in one
//! log, so the trail stays queryable without string-sniffing.

use serde::{Deserialize, Serialize};

use super::FaultStatus;

/// Audit event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum HistoryKind {
    #[serde(rename = "status_changed")]
    #[sqlx(rename = "status_changed")]
    StatusChanged,
    #[serde(rename = "transferred")]
    #[sqlx(rename = "transferred")]
    Transferred,
}

/// History row as stored. Status fields are set for `StatusChanged`
/// events, department fields for `Transferred` events.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaultHistory {
    pub id: i64,
    pub fault_id: i64,
    pub kind: HistoryKind,
    pub previous_status: Option<FaultStatus>,
    pub new_status: Option<FaultStatus>,
    pub from_department_id: Option<i64>,
    pub to_department_id: Option<i64>,
    /// Acting user.
    pub changed_by: i64,
    pub note: Option<String>,
    pub created_at: i64,
}

/// History row joined with actor and department names, as served by the
/// history endpoint (newest first).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaultHistoryEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: FaultHistory,
    pub changed_by_username: Option<String>,
    pub from_department_name: Option<String>,
    pub to_department_name: Option<String>,
}
