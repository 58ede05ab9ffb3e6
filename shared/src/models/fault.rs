//! Fault (trouble ticket) model and lifecycle payloads.

use serde::{Deserialize, Serialize};

/// Fault lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum FaultStatus {
    #[serde(rename = "Open")]
    #[sqlx(rename = "Open")]
    Open,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Resolved")]
    #[sqlx(rename = "Resolved")]
    Resolved,
    #[serde(rename = "Closed")]
    #[sqlx(rename = "Closed")]
    Closed,
}

impl FaultStatus {
    pub const ALL: [FaultStatus; 4] = [
        FaultStatus::Open,
        FaultStatus::InProgress,
        FaultStatus::Resolved,
        FaultStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultStatus::Open => "Open",
            FaultStatus::InProgress => "In Progress",
            FaultStatus::Resolved => "Resolved",
            FaultStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<FaultStatus> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    /// Resolved and Closed freeze severity/pending-hours.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FaultStatus::Resolved | FaultStatus::Closed)
    }
}

impl std::fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier, derived from elapsed unresolved time or frozen at closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    pub fn parse(s: &str) -> Option<Severity> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fault record as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Fault {
    pub id: i64,
    pub ticket_number: Option<String>,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub fault_type: Option<String>,
    pub location: Option<String>,
    pub owner: Option<String>,
    pub status: FaultStatus,
    pub severity: Severity,
    /// Persisted snapshot; authoritative only once the fault is terminal.
    pub pending_hours: Option<f64>,
    pub resolved_at: Option<i64>,
    pub closed_at: Option<i64>,
    pub resolved_by: Option<i64>,
    pub closed_by: Option<i64>,
    pub customer_id: Option<i64>,
    /// Owning department.
    pub assigned_to_id: Option<i64>,
    /// Generic-fault classification, e.g. "Switch", "Link", "FTTH".
    pub general_type: Option<String>,
    /// Generic-fault reference, e.g. "Ajah POP", "Link ID 203".
    pub general_reference: Option<String>,
    /// Optimistic-concurrency counter, incremented on every write.
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fault row joined with its references, as returned by list/dashboard reads.
/// `severity`/`pending_hours` are overwritten by the enrichment pass for
/// non-terminal faults before serialization.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FaultWithRefs {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fault: Fault,
    pub department_name: Option<String>,
    pub customer_company: Option<String>,
    pub customer_circuit_id: Option<String>,
    pub customer_location: Option<String>,
    pub customer_ip_address: Option<String>,
    pub customer_pop_site: Option<String>,
    pub resolved_by_username: Option<String>,
    pub closed_by_username: Option<String>,
}

/// Create payload for a customer-circuit fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultCreate {
    pub description: String,
    pub status: FaultStatus,
    pub customer_id: i64,
    /// Target department.
    pub assigned_to_id: i64,
    pub ticket_number: Option<String>,
    #[serde(rename = "type")]
    pub fault_type: Option<String>,
    pub location: Option<String>,
    pub owner: Option<String>,
    /// Seed for the initial severity classification.
    pub pending_hours: Option<f64>,
}

/// Create payload for a general (non-customer) fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultGeneralCreate {
    pub description: String,
    pub general_type: Option<String>,
    pub general_reference: Option<String>,
    pub assigned_to_id: Option<i64>,
    pub status: Option<FaultStatus>,
    #[serde(rename = "type")]
    pub fault_type: Option<String>,
    pub location: Option<String>,
    pub owner: Option<String>,
}

/// Update payload; all fields optional. A `status` different from the
/// current one triggers the lifecycle state machine, a `department_id`
/// different from the current assignment triggers a transfer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultUpdate {
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub fault_type: Option<String>,
    pub location: Option<String>,
    pub owner: Option<String>,
    pub customer_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
    pub status: Option<FaultStatus>,
    pub department_id: Option<i64>,
    pub pending_hours: Option<f64>,
    /// Free-text note attached to the history entry.
    pub note: Option<String>,
    /// When supplied, the write is rejected unless it matches the stored
    /// version.
    pub expected_version: Option<i64>,
}

/// Transfer payload for the dedicated transfer endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultTransfer {
    pub department_id: i64,
    pub note: Option<String>,
    pub expected_version: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_labels() {
        for status in FaultStatus::ALL {
            assert_eq!(FaultStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(FaultStatus::parse("in progress"), None);
    }

    #[test]
    fn status_serde_uses_display_labels() {
        let json = serde_json::to_string(&FaultStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: FaultStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FaultStatus::InProgress);
    }

    #[test]
    fn terminal_states() {
        assert!(!FaultStatus::Open.is_terminal());
        assert!(!FaultStatus::InProgress.is_terminal());
        assert!(FaultStatus::Resolved.is_terminal());
        assert!(FaultStatus::Closed.is_terminal());
    }
}
