use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{ComplianceStatus, WeeklyRecord};

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

// ── ComplianceCalculator ──────────────────────────────────────────────────────

/// Stateless derivation of the weekly compliance figures.
pub struct ComplianceCalculator;

impl ComplianceCalculator {
    /// Build a [`WeeklyRecord`] from raw weekly totals.
    ///
    /// Status is decided on the unrounded total; every float field is then
    /// rounded to 2 decimals. `target_hours` must be positive.
    pub fn weekly_record(
        employee_id: &str,
        week_start: NaiveDate,
        total_hours: f64,
        days_worked: u32,
        target_hours: f64,
    ) -> WeeklyRecord {
        let gap_hours = target_hours - total_hours;
        let gap_percent = gap_hours / target_hours * 100.0;
        let performance_score = total_hours / target_hours * 100.0;
        let status = if total_hours >= target_hours {
            ComplianceStatus::Met
        } else {
            ComplianceStatus::Below
        };

        WeeklyRecord {
            employee_id: employee_id.to_string(),
            week_start,
            total_hours: round_to(total_hours, 2),
            days_worked,
            target_hours: round_to(target_hours, 2),
            gap_hours: round_to(gap_hours, 2),
            gap_percent: round_to(gap_percent, 2),
            performance_score: round_to(performance_score, 2),
            status,
        }
    }
}

// ── ReportSummary ─────────────────────────────────────────────────────────────

/// Cross-record totals shown next to the weekly table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Sum of `total_hours`, rounded to 1 decimal.
    pub total_actual_hours: f64,
    /// `total_records * target_hours`.
    pub total_target_hours: f64,
    /// Mean `performance_score`, rounded to 1 decimal.
    pub avg_performance: f64,
    /// Number of records with status `met`.
    pub compliant_records: usize,
    /// `compliant_records / total_records * 100`, rounded to 1 decimal.
    pub compliance_rate: f64,
    pub total_records: usize,
}

impl ReportSummary {
    /// Summarise `records` against `target_hours`.
    ///
    /// Returns `None` for an empty slice instead of dividing by zero.
    pub fn from_records(records: &[WeeklyRecord], target_hours: f64) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let count = records.len();
        let total_actual: f64 = records.iter().map(|r| r.total_hours).sum();
        let total_performance: f64 = records.iter().map(|r| r.performance_score).sum();
        let compliant = records.iter().filter(|r| r.is_met()).count();

        Some(Self {
            total_actual_hours: round_to(total_actual, 1),
            total_target_hours: round_to(count as f64 * target_hours, 2),
            avg_performance: round_to(total_performance / count as f64, 1),
            compliant_records: compliant,
            compliance_rate: round_to(compliant as f64 / count as f64 * 100.0, 1),
            total_records: count,
        })
    }
}

/// Sorted, de-duplicated employee identifiers.
pub fn unique_employees(records: &[WeeklyRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.employee_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, de-duplicated week starts as `YYYY-MM-DD`.
pub fn unique_weeks(records: &[WeeklyRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.week_start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
