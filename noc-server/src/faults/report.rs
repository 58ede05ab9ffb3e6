//! Reporting Aggregator
//!
//! Summary counts and chart series over enriched fault sets, plus the
//! zero-filling for store-level grouped trends. All functions here are
//! pure projections; enrichment must already have run.

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use serde::Serialize;
use shared::models::{FaultStatus, FaultWithRefs, Severity};

/// Fixed 4-bucket status counts, keyed by the display labels.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusCounts {
    #[serde(rename = "Open")]
    pub open: i64,
    #[serde(rename = "In Progress")]
    pub in_progress: i64,
    #[serde(rename = "Resolved")]
    pub resolved: i64,
    #[serde(rename = "Closed")]
    pub closed: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: FaultStatus, n: i64) {
        match status {
            FaultStatus::Open => self.open += n,
            FaultStatus::InProgress => self.in_progress += n,
            FaultStatus::Resolved => self.resolved += n,
            FaultStatus::Closed => self.closed += n,
        }
    }

    pub fn total(&self) -> i64 {
        self.open + self.in_progress + self.resolved + self.closed
    }
}

/// Fixed 4-bucket severity counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeverityCounts {
    #[serde(rename = "Low")]
    pub low: i64,
    #[serde(rename = "Medium")]
    pub medium: i64,
    #[serde(rename = "High")]
    pub high: i64,
    #[serde(rename = "Critical")]
    pub critical: i64,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity, n: i64) {
        match severity {
            Severity::Low => self.low += n,
            Severity::Medium => self.medium += n,
            Severity::High => self.high += n,
            Severity::Critical => self.critical += n,
        }
    }

    pub fn total(&self) -> i64 {
        self.low + self.medium + self.high + self.critical
    }
}

/// Summary metrics for a fault set.
#[derive(Debug, Clone, Serialize)]
pub struct FaultMetrics {
    pub total: i64,
    pub status_counts: StatusCounts,
    pub severity_counts: SeverityCounts,
    /// Per-department-name counts; faults without an assignment land in
    /// "Unassigned".
    pub department_counts: BTreeMap<String, i64>,
}

/// One point of the daily creation trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: i64,
}

/// Chart payload: breakdowns plus the trailing 7-day creation trend.
#[derive(Debug, Clone, Serialize)]
pub struct FaultCharts {
    pub severity_counts: SeverityCounts,
    pub department_counts: BTreeMap<String, i64>,
    pub trend: Vec<TrendPoint>,
}

/// Status counts for the department dashboard, snake_case keyed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DepartmentStatusCounts {
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
}

/// Fold SQL `GROUP BY status` rows into the fixed dashboard shape.
pub fn department_status_counts(rows: &[(FaultStatus, i64)]) -> DepartmentStatusCounts {
    let mut counts = DepartmentStatusCounts::default();
    for (status, n) in rows {
        match status {
            FaultStatus::Open => counts.open += n,
            FaultStatus::InProgress => counts.in_progress += n,
            FaultStatus::Resolved => counts.resolved += n,
            FaultStatus::Closed => counts.closed += n,
        }
    }
    counts
}

pub fn summarize(faults: &[FaultWithRefs]) -> FaultMetrics {
    let mut status_counts = StatusCounts::default();
    let mut severity_counts = SeverityCounts::default();
    let mut department_counts: BTreeMap<String, i64> = BTreeMap::new();

    for f in faults {
        status_counts.add(f.fault.status, 1);
        severity_counts.add(f.fault.severity, 1);
        let dept = f
            .department_name
            .clone()
            .unwrap_or_else(|| "Unassigned".to_string());
        *department_counts.entry(dept).or_insert(0) += 1;
    }

    FaultMetrics {
        total: faults.len() as i64,
        status_counts,
        severity_counts,
        department_counts,
    }
}

pub fn build_charts(faults: &[FaultWithRefs], now_ms: i64) -> FaultCharts {
    let metrics = summarize(faults);
    FaultCharts {
        severity_counts: metrics.severity_counts,
        department_counts: metrics.department_counts,
        trend: seven_day_trend(faults, now_ms),
    }
}

/// Trailing 7-day daily created counts, zero-filled, oldest day first.
pub fn seven_day_trend(faults: &[FaultWithRefs], now_ms: i64) -> Vec<TrendPoint> {
    let mut per_day: BTreeMap<String, i64> = BTreeMap::new();
    for f in faults {
        if let Some(day) = date_label(f.fault.created_at) {
            *per_day.entry(day).or_insert(0) += 1;
        }
    }
    zero_fill_trend(&per_day, now_ms)
}

/// Zero-fill store-level grouped rows (YYYY-MM-DD, count) into a full
/// trailing 7-day series.
pub fn zero_fill_rows(rows: &[(String, i64)], now_ms: i64) -> Vec<TrendPoint> {
    let per_day: BTreeMap<String, i64> = rows.iter().cloned().collect();
    zero_fill_trend(&per_day, now_ms)
}

fn zero_fill_trend(per_day: &BTreeMap<String, i64>, now_ms: i64) -> Vec<TrendPoint> {
    let Some(today) = Utc.timestamp_millis_opt(now_ms).single() else {
        return Vec::new();
    };
    let today = today.date_naive();

    (0..7)
        .rev()
        .map(|back| {
            let date = (today - Duration::days(back)).format("%Y-%m-%d").to_string();
            let count = per_day.get(&date).copied().unwrap_or(0);
            TrendPoint { date, count }
        })
        .collect()
}

fn date_label(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}
