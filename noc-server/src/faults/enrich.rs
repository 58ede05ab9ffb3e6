//! Fault Enrichment Pipeline
//!
//! Recomputes the derived fields on retrieved fault rows before they are
//! serialized or aggregated. Side-effect-free: nothing here is persisted;
//! the terminal snapshot is written only by the lifecycle state machine.

use shared::models::{Fault, FaultStatus, FaultWithRefs, Severity};
use shared::util::{millis_to_hours, round1};

use super::severity::classify_severity;

/// Hours a fault has been pending: creation to the terminal timestamp for
/// Resolved/Closed faults, creation to now otherwise. Rounded to one
/// decimal, clamped at zero.
pub fn pending_hours(fault: &Fault, now_ms: i64) -> f64 {
    let reference = match fault.status {
        FaultStatus::Resolved => fault.resolved_at.unwrap_or(now_ms),
        FaultStatus::Closed => fault.closed_at.unwrap_or(now_ms),
        FaultStatus::Open | FaultStatus::InProgress => now_ms,
    };
    round1(millis_to_hours((reference - fault.created_at).max(0)))
}

/// Live severity for a fault: classified from elapsed time while the
/// fault is active, the stored (frozen) value once terminal.
pub fn live_severity(fault: &Fault, now_ms: i64) -> Severity {
    if fault.status.is_terminal() {
        fault.severity
    } else {
        classify_severity(pending_hours(fault, now_ms))
    }
}

/// Overwrite the derived fields in place.
pub fn enrich(fault: &mut Fault, now_ms: i64) {
    let hours = pending_hours(fault, now_ms);
    if !fault.status.is_terminal() {
        fault.severity = classify_severity(hours);
    }
    fault.pending_hours = Some(hours);
}

pub fn enrich_all(faults: &mut [FaultWithRefs], now_ms: i64) {
    for f in faults {
        enrich(&mut f.fault, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    fn fault_at(created_at: i64, status: FaultStatus) -> Fault {
        Fault {
            id: 1,
            ticket_number: None,
            description: "link down".into(),
            fault_type: None,
            location: None,
            owner: None,
            status,
            severity: Severity::Low,
            pending_hours: None,
            resolved_at: None,
            closed_at: None,
            resolved_by: None,
            closed_by: None,
            customer_id: None,
            assigned_to_id: None,
            general_type: None,
            general_reference: None,
            version: 0,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn active_fault_severity_tracks_elapsed_time() {
        let mut f = fault_at(0, FaultStatus::InProgress);
        enrich(&mut f, 5 * HOUR_MS);
        assert_eq!(f.severity, Severity::Medium);
        assert_eq!(f.pending_hours, Some(5.0));

        // severity crosses a threshold on a later read
        enrich(&mut f, 13 * HOUR_MS);
        assert_eq!(f.severity, Severity::High);
    }

    #[test]
    fn terminal_fault_keeps_frozen_snapshot() {
        let mut f = fault_at(0, FaultStatus::Resolved);
        f.resolved_at = Some(30 * HOUR_MS);
        f.severity = Severity::Critical;
        // read long after resolution
        enrich(&mut f, 100 * HOUR_MS);
        assert_eq!(f.pending_hours, Some(30.0));
        assert_eq!(f.severity, Severity::Critical);
    }

    #[test]
    fn pending_hours_clamped_at_zero() {
        let f = fault_at(10 * HOUR_MS, FaultStatus::Open);
        assert_eq!(pending_hours(&f, 9 * HOUR_MS), 0.0);
    }
}
