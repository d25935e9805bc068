//! JSON report and CSV export of weekly records.

use std::io::Write;
use std::path::{Path, PathBuf};

use attendance_core::calculations::ReportSummary;
use attendance_core::error::{AttendanceError, Result};
use attendance_core::models::WeeklyRecord;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::analysis::AnalysisResult;

/// The JSON document produced for a successful run.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub success: bool,
    pub data: &'a [WeeklyRecord],
    pub stats: Option<&'a ReportSummary>,
    pub users: &'a [String],
    pub weeks: &'a [String],
}

impl<'a> ReportDocument<'a> {
    pub fn from_result(result: &'a AnalysisResult) -> Self {
        Self {
            success: true,
            data: result.records(),
            stats: result.summary.as_ref(),
            users: &result.employees,
            weeks: &result.weeks,
        }
    }
}

/// Pretty-printed JSON report for `result`.
pub fn report_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ReportDocument::from_result(result))?)
}

/// `attendance_report_YYYYMMDD_HHMMSS.csv`
pub fn export_filename(at: NaiveDateTime) -> String {
    format!("attendance_report_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write `records` as CSV with a header row.
///
/// Refuses an empty slice with [`AttendanceError::NothingToExport`].
pub fn write_csv<W: Write>(writer: W, records: &[WeeklyRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(AttendanceError::NothingToExport);
    }

    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `records` to a timestamped CSV file inside `dir`, creating it if
/// needed. Returns the path written.
pub fn export_csv(dir: &Path, records: &[WeeklyRecord]) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(AttendanceError::NothingToExport);
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(Local::now().naive_local()));
    let file = std::fs::File::create(&path)?;
    write_csv(file, records)?;

    info!("Exported {} records to {}", records.len(), path.display());
    Ok(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_attendance;
    use attendance_core::calculations::ComplianceCalculator;
    use attendance_core::models::AttendancePolicy;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(user: &str, total: f64) -> WeeklyRecord {
        let week = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ComplianceCalculator::weekly_record(user, week, total, 4, 40.0)
    }

    #[test]
    fn test_export_filename_format() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        assert_eq!(export_filename(at), "attendance_report_20240309_140507.csv");
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record("alice", 32.0)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "user,week,total_hours,days_worked,target_hours,gap_hours,gap_percent,performance_score,status"
        );
        assert_eq!(lines.next().unwrap(), "alice,2024-01-01,32.0,4,40.0,8.0,20.0,80.0,below");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_csv_refuses_empty() {
        let err = write_csv(Vec::new(), &[]).unwrap_err();
        assert!(matches!(err, AttendanceError::NothingToExport));
        assert_eq!(err.to_string(), "No data to export");
    }

    #[test]
    fn test_export_csv_creates_dir_and_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("exports");
        let path = export_csv(&dir, &[record("alice", 40.0), record("bob", 10.0)]).unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("attendance_report_") && name.ends_with(".csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_report_json_shape() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("badges.csv");
        std::fs::write(
            &path,
            "Date/time,User,Where\n2024-01-01 09:00,alice,In\n2024-01-01 17:00,alice,Out\n",
        )
        .unwrap();
        let result = analyze_attendance(&path, &AttendancePolicy::default()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&report_json(&result).unwrap()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0]["user"], "alice");
        assert_eq!(json["data"][0]["total_hours"], 8.0);
        assert_eq!(json["stats"]["total_records"], 1);
        assert_eq!(json["users"][0], "alice");
        assert_eq!(json["weeks"][0], "2024-01-01");
    }
}
