//! Severity Classifier
//!
//! Maps elapsed unresolved hours to an urgency tier. Fixed thresholds,
//! pure and total. Every read path that shows live severity goes through
//! this one function.

use shared::models::Severity;

/// `<4 → Low`, `<12 → Medium`, `<24 → High`, else `Critical`.
pub fn classify_severity(hours: f64) -> Severity {
    if hours < 4.0 {
        Severity::Low
    } else if hours < 12.0 {
        Severity::Medium
    } else if hours < 24.0 {
        Severity::High
    } else {
        Severity::Critical
    }
}
