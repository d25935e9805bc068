use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::PROCESSING_FAILURE_MESSAGE;

/// Weekly hours an employee is expected to work unless configured otherwise.
pub const DEFAULT_TARGET_WEEKLY_HOURS: f64 = 40.0;

/// Header names every attendance CSV must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Date/time", "User", "Where"];

/// Badge direction derived from an event label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Check-in swipe.
    In,
    /// Check-out swipe.
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "In",
            Direction::Out => "Out",
        }
    }
}

/// Rule used to derive a [`Direction`] from a free-text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DirectionMatcher {
    /// `in` / `out` as whole words, case-insensitive.
    #[default]
    Token,
    /// Case-sensitive `"In"` / `"Out"` anywhere in the label.
    Substring,
}

impl DirectionMatcher {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionMatcher::Token => "token",
            DirectionMatcher::Substring => "substring",
        }
    }
}

/// Run-wide configuration handed to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendancePolicy {
    /// Weekly hours required for a `met` status.
    pub target_hours: f64,
    /// How event labels are classified into directions.
    pub direction_matcher: DirectionMatcher,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            target_hours: DEFAULT_TARGET_WEEKLY_HOURS,
            direction_matcher: DirectionMatcher::default(),
        }
    }
}

/// One CSV row exactly as read from the badge export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Unparsed date-time cell.
    #[serde(rename = "Date/time")]
    pub timestamp: String,
    /// Employee identifier.
    #[serde(rename = "User")]
    pub employee_id: String,
    /// Free-text location / direction label, e.g. `"Main Door In"`.
    #[serde(rename = "Where", default)]
    pub label: String,
}

/// A badge event whose timestamp has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub employee_id: String,
    pub timestamp: NaiveDateTime,
    pub label: String,
}

/// Why a session's raw duration looks wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAnomaly {
    /// Latest check-out precedes earliest check-in.
    Negative,
    /// Longer than [`MAX_PLAUSIBLE_DAILY_HOURS`], usually a stray late swipe.
    Excessive,
}

/// Longest span between first check-in and last check-out treated as a
/// real working day.
pub const MAX_PLAUSIBLE_DAILY_HOURS: f64 = 16.0;

/// Earliest check-in and latest check-out of one employee on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySession {
    pub employee_id: String,
    pub date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub check_out: NaiveDateTime,
    /// `check_out - check_in` in fractional hours, unrounded and unclamped.
    pub hours_worked: f64,
}

impl DailySession {
    /// Build a session, deriving `hours_worked` from the two timestamps.
    pub fn new(
        employee_id: impl Into<String>,
        date: NaiveDate,
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    ) -> Self {
        let span = check_out - check_in;
        let hours_worked = match span.num_nanoseconds() {
            Some(ns) => ns as f64 / 3_600_000_000_000.0,
            None => span.num_seconds() as f64 / 3600.0,
        };
        Self {
            employee_id: employee_id.into(),
            date,
            check_in,
            check_out,
            hours_worked,
        }
    }

    /// Classify an implausible duration, if any.
    pub fn anomaly(&self) -> Option<SessionAnomaly> {
        if self.hours_worked < 0.0 {
            Some(SessionAnomaly::Negative)
        } else if self.hours_worked > MAX_PLAUSIBLE_DAILY_HOURS {
            Some(SessionAnomaly::Excessive)
        } else {
            None
        }
    }
}

/// Weekly compliance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Met,
    Below,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Met => "met",
            ComplianceStatus::Below => "below",
        }
    }

    /// Parse `"met"` / `"below"` (any case).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "met" => Some(Self::Met),
            "below" => Some(Self::Below),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attendance totals for one employee over one Monday-based week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    #[serde(rename = "user")]
    pub employee_id: String,
    /// Monday of the week, serialised as `YYYY-MM-DD`.
    #[serde(rename = "week")]
    pub week_start: NaiveDate,
    pub total_hours: f64,
    pub days_worked: u32,
    pub target_hours: f64,
    /// `target_hours - total_hours`; negative when over target.
    pub gap_hours: f64,
    pub gap_percent: f64,
    pub performance_score: f64,
    pub status: ComplianceStatus,
}

impl WeeklyRecord {
    /// `week_start` formatted as `YYYY-MM-DD`.
    pub fn week_key(&self) -> String {
        self.week_start.format("%Y-%m-%d").to_string()
    }

    pub fn is_met(&self) -> bool {
        self.status == ComplianceStatus::Met
    }
}

/// Caller-side selection over weekly records; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub employee: Option<String>,
    pub week: Option<NaiveDate>,
    pub status: Option<ComplianceStatus>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.employee.is_none() && self.week.is_none() && self.status.is_none()
    }

    pub fn matches(&self, record: &WeeklyRecord) -> bool {
        self.employee
            .as_deref()
            .map_or(true, |e| e == record.employee_id)
            && self.week.map_or(true, |w| w == record.week_start)
            && self.status.map_or(true, |s| s == record.status)
    }

    /// Records that pass the filter, in their original order.
    pub fn apply(&self, records: &[WeeklyRecord]) -> Vec<WeeklyRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Result of running the pipeline over a parsed batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// At least one complete day was found.
    Processed(Vec<WeeklyRecord>),
    /// The batch was valid but no (employee, day) had both an In and an Out.
    NoSessions,
}

impl ProcessOutcome {
    /// The produced records, or an empty slice for [`ProcessOutcome::NoSessions`].
    pub fn records(&self) -> &[WeeklyRecord] {
        match self {
            ProcessOutcome::Processed(records) => records,
            ProcessOutcome::NoSessions => &[],
        }
    }

    pub fn into_records(self) -> Option<Vec<WeeklyRecord>> {
        match self {
            ProcessOutcome::Processed(records) => Some(records),
            ProcessOutcome::NoSessions => None,
        }
    }

    /// Message a host shows when nothing could be produced.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            ProcessOutcome::Processed(_) => None,
            ProcessOutcome::NoSessions => Some(PROCESSING_FAILURE_MESSAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_session_hours_from_timestamps() {
        let s = DailySession::new(
            "alice",
            date("2024-01-01"),
            dt("2024-01-01 09:00:00"),
            dt("2024-01-01 17:00:00"),
        );
        assert_eq!(s.hours_worked, 8.0);
        assert!(s.anomaly().is_none());
    }

    #[test]
    fn test_daily_session_fractional_hours() {
        let s = DailySession::new(
            "bob",
            date("2024-01-02"),
            dt("2024-01-02 08:15:00"),
            dt("2024-01-02 16:45:30"),
        );
        let expected = (8.0 * 3600.0 + 30.0 * 60.0 + 30.0) / 3600.0;
        assert!((s.hours_worked - expected).abs() < 1e-12);
    }

    #[test]
    fn test_daily_session_negative_is_flagged_not_clamped() {
        let s = DailySession::new(
            "carol",
            date("2024-01-03"),
            dt("2024-01-03 17:00:00"),
            dt("2024-01-03 09:00:00"),
        );
        assert_eq!(s.hours_worked, -8.0);
        assert_eq!(s.anomaly(), Some(SessionAnomaly::Negative));
    }

    #[test]
    fn test_daily_session_keeps_sub_millisecond_precision() {
        let check_in = dt("2024-01-01 09:00:00");
        let check_out =
            NaiveDateTime::parse_from_str("2024-01-01 16:59:59.9996", "%Y-%m-%d %H:%M:%S%.f").unwrap();
        let s = DailySession::new("alice", date("2024-01-01"), check_in, check_out);

        let micros = (check_out - check_in).num_microseconds().unwrap();
        assert_eq!(micros, 28_799_999_600);
        assert!((s.hours_worked - micros as f64 / 3.6e9).abs() < 1e-12);
        assert!(s.hours_worked > 7.999_999_8);
    }

    #[test]
    fn test_daily_session_long_day_is_flagged() {
        let s = DailySession::new(
            "dave",
            date("2024-01-04"),
            dt("2024-01-04 00:00:00"),
            dt("2024-01-04 23:59:59"),
        );
        assert_eq!(s.anomaly(), Some(SessionAnomaly::Excessive));

        let at_limit = DailySession::new(
            "dave",
            date("2024-01-05"),
            dt("2024-01-05 06:00:00"),
            dt("2024-01-05 22:00:00"),
        );
        assert_eq!(at_limit.hours_worked, MAX_PLAUSIBLE_DAILY_HOURS);
        assert!(at_limit.anomaly().is_none());
    }

    #[test]
    fn test_compliance_status_serialises_lowercase() {
        let json = serde_json::to_string(&ComplianceStatus::Met).unwrap();
        assert_eq!(json, "\"met\"");
        assert_eq!(ComplianceStatus::parse("BELOW"), Some(ComplianceStatus::Below));
        assert_eq!(ComplianceStatus::parse("late"), None);
    }

    #[test]
    fn test_weekly_record_week_start_serialises_iso_date() {
        let rec = WeeklyRecord {
            employee_id: "alice".to_string(),
            week_start: date("2024-01-01"),
            total_hours: 40.0,
            days_worked: 5,
            target_hours: 40.0,
            gap_hours: 0.0,
            gap_percent: 0.0,
            performance_score: 100.0,
            status: ComplianceStatus::Met,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["week"], "2024-01-01");
        assert_eq!(json["status"], "met");
        assert_eq!(rec.week_key(), "2024-01-01");
    }

    #[test]
    fn test_raw_record_deserialises_from_csv_headers() {
        let data = "Date/time,User,Where\n2024-01-01 09:00:00,alice,Front In\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rec: RawRecord = rdr.deserialize().next().unwrap().unwrap();
        assert_eq!(rec.employee_id, "alice");
        assert_eq!(rec.label, "Front In");
    }

    #[test]
    fn test_process_outcome_no_sessions_message() {
        let outcome = ProcessOutcome::NoSessions;
        assert!(outcome.records().is_empty());
        assert_eq!(outcome.user_message(), Some(PROCESSING_FAILURE_MESSAGE));
        assert!(outcome.into_records().is_none());
    }

    #[test]
    fn test_record_filter_combines_fields() {
        let make = |user: &str, week: &str, status| WeeklyRecord {
            employee_id: user.to_string(),
            week_start: date(week),
            total_hours: 0.0,
            days_worked: 0,
            target_hours: 40.0,
            gap_hours: 40.0,
            gap_percent: 100.0,
            performance_score: 0.0,
            status,
        };
        let records = vec![
            make("alice", "2024-01-01", ComplianceStatus::Met),
            make("alice", "2024-01-08", ComplianceStatus::Below),
            make("bob", "2024-01-01", ComplianceStatus::Below),
        ];

        assert_eq!(RecordFilter::default().apply(&records).len(), 3);

        let by_user = RecordFilter {
            employee: Some("alice".to_string()),
            ..Default::default()
        };
        assert_eq!(by_user.apply(&records).len(), 2);

        let narrow = RecordFilter {
            employee: Some("alice".to_string()),
            week: Some(date("2024-01-08")),
            status: Some(ComplianceStatus::Below),
        };
        let hits = narrow.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].week_key(), "2024-01-08");
        assert!(!narrow.is_empty());
    }

    #[test]
    fn test_policy_default_target() {
        let policy = AttendancePolicy::default();
        assert_eq!(policy.target_hours, 40.0);
        assert_eq!(policy.direction_matcher, DirectionMatcher::Token);
    }
}
