//! Daily sessions to weekly compliance records.

use std::collections::BTreeMap;

use attendance_core::calculations::{week_start, ComplianceCalculator};
use attendance_core::models::{DailySession, ProcessOutcome, DEFAULT_TARGET_WEEKLY_HOURS};
use chrono::NaiveDate;
use tracing::debug;

/// Running totals for one (employee, week).
#[derive(Debug, Default)]
struct WeekTotals {
    hours: f64,
    days: u32,
}

// ── WeeklyAggregator ──────────────────────────────────────────────────────────

/// Groups sessions by employee and Monday-start week and scores each week
/// against `target_hours`.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyAggregator {
    target_hours: f64,
}

impl Default for WeeklyAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_WEEKLY_HOURS)
    }
}

impl WeeklyAggregator {
    /// `target_hours` must be positive.
    pub fn new(target_hours: f64) -> Self {
        Self { target_hours }
    }

    pub fn target_hours(&self) -> f64 {
        self.target_hours
    }

    /// Records sorted by employee then week, or [`ProcessOutcome::NoSessions`]
    /// for an empty slice.
    pub fn aggregate(&self, sessions: &[DailySession]) -> ProcessOutcome {
        if sessions.is_empty() {
            return ProcessOutcome::NoSessions;
        }

        // BTreeMap keeps (employee, week) ordering.
        let mut weeks: BTreeMap<(&str, NaiveDate), WeekTotals> = BTreeMap::new();
        for session in sessions {
            let totals = weeks
                .entry((session.employee_id.as_str(), week_start(session.date)))
                .or_default();
            totals.hours += session.hours_worked;
            totals.days += 1;
        }

        let records: Vec<_> = weeks
            .into_iter()
            .map(|((employee_id, week), totals)| {
                ComplianceCalculator::weekly_record(
                    employee_id,
                    week,
                    totals.hours,
                    totals.days,
                    self.target_hours,
                )
            })
            .collect();

        debug!(
            "Aggregated {} sessions into {} weekly records",
            sessions.len(),
            records.len()
        );
        ProcessOutcome::Processed(records)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::ComplianceStatus;

    fn session(user: &str, date: &str, start: u32, end: u32) -> DailySession {
        let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        DailySession::new(
            user,
            d,
            d.and_hms_opt(start, 0, 0).unwrap(),
            d.and_hms_opt(end, 0, 0).unwrap(),
        )
    }

    fn workweek(user: &str, days: &[&str]) -> Vec<DailySession> {
        days.iter().map(|d| session(user, d, 9, 17)).collect()
    }

    const MON_FRI: [&str; 5] = [
        "2024-01-01",
        "2024-01-02",
        "2024-01-03",
        "2024-01-04",
        "2024-01-05",
    ];

    #[test]
    fn test_empty_is_no_sessions() {
        assert_eq!(WeeklyAggregator::default().aggregate(&[]), ProcessOutcome::NoSessions);
    }

    #[test]
    fn test_full_week_meets_target() {
        let outcome = WeeklyAggregator::default().aggregate(&workweek("alice", &MON_FRI));
        let records = outcome.records();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.week_key(), "2024-01-01");
        assert_eq!(r.total_hours, 40.0);
        assert_eq!(r.days_worked, 5);
        assert_eq!(r.gap_hours, 0.0);
        assert_eq!(r.status, ComplianceStatus::Met);
    }

    #[test]
    fn test_four_days_is_below() {
        let outcome = WeeklyAggregator::default().aggregate(&workweek("alice", &MON_FRI[..4]));
        let r = &outcome.records()[0];
        assert_eq!(r.total_hours, 32.0);
        assert_eq!(r.gap_hours, 8.0);
        assert_eq!(r.gap_percent, 20.0);
        assert_eq!(r.performance_score, 80.0);
        assert_eq!(r.status, ComplianceStatus::Below);
    }

    #[test]
    fn test_custom_target() {
        let outcome = WeeklyAggregator::new(32.0).aggregate(&workweek("alice", &MON_FRI[..4]));
        assert_eq!(outcome.records()[0].status, ComplianceStatus::Met);
        assert_eq!(outcome.records()[0].target_hours, 32.0);
    }

    #[test]
    fn test_groups_by_week_and_employee_sorted() {
        let mut sessions = workweek("bob", &["2024-01-08"]);
        sessions.extend(workweek("alice", &["2024-01-09", "2024-01-02"]));
        sessions.extend(workweek("bob", &["2024-01-03"]));

        let outcome = WeeklyAggregator::default().aggregate(&sessions);
        let keys: Vec<(&str, String)> = outcome
            .records()
            .iter()
            .map(|r| (r.employee_id.as_str(), r.week_key()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("alice", "2024-01-01".to_string()),
                ("alice", "2024-01-08".to_string()),
                ("bob", "2024-01-01".to_string()),
                ("bob", "2024-01-08".to_string()),
            ]
        );
    }

    #[test]
    fn test_negative_hours_reduce_total() {
        let sessions = vec![session("alice", "2024-01-01", 9, 17), session("alice", "2024-01-02", 17, 9)];
        let outcome = WeeklyAggregator::default().aggregate(&sessions);
        assert_eq!(outcome.records()[0].total_hours, 0.0);
        assert_eq!(outcome.records()[0].days_worked, 2);
    }
}
