mod bootstrap;

use std::fmt::Write as _;

use anyhow::Result;
use attendance_core::calculations::{unique_employees, unique_weeks, ReportSummary};
use attendance_core::error::{AttendanceError, PROCESSING_FAILURE_MESSAGE};
use attendance_core::formatting::{format_gap, format_hours, format_percent};
use attendance_core::models::RecordFilter;
use attendance_core::settings::Settings;
use attendance_data::analysis::{analyze_attendance, AnalysisResult};
use attendance_data::export;
use attendance_ui::app::App;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let app_dirs = bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Attendance Monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Target: {}h",
        settings.view,
        settings.theme,
        settings.target_hours
    );

    let Some(input) = settings.input.clone() else {
        eprintln!("No input given. Pass a badge export CSV file or a directory of CSV files.");
        std::process::exit(1);
    };

    let policy = settings.policy();
    let result = match analyze_attendance(&input, &policy) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Analysis failed: {}", e);
            eprintln!("Error: {}", user_message(&e));
            std::process::exit(1);
        }
    };

    if let Some(message) = result.outcome.user_message() {
        tracing::warn!(
            "No complete sessions in {} ({} rows read)",
            input.display(),
            result.metadata.rows_read
        );
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }

    let filter = settings.record_filter();

    match settings.view.as_str() {
        "json" => {
            println!("{}", export::report_json(&result)?);
        }

        "csv" => {
            let visible = filter.apply(result.records());
            if let Err(e) = export::write_csv(std::io::stdout().lock(), &visible) {
                eprintln!("Error: {}", user_message(&e));
                std::process::exit(1);
            }
        }

        "summary" => {
            print!("{}", render_summary(&result, &filter));
        }

        "table" => {
            let export_dir = settings
                .export_dir
                .clone()
                .unwrap_or_else(|| app_dirs.exports.clone());
            let source = input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| input.display().to_string());

            let app = App::new(
                &settings.theme,
                source,
                settings.target_hours,
                result.outcome.into_records().unwrap_or_default(),
                export_dir,
            )
            .with_filter(filter);

            app.run_table()?;
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Text shown to the user for a failed run.
///
/// Processing failures share one generic message; the precise cause is in
/// the log.
fn user_message(err: &AttendanceError) -> String {
    if err.is_processing_failure() {
        PROCESSING_FAILURE_MESSAGE.to_string()
    } else {
        err.to_string()
    }
}

/// Plain-text report of the records passing `filter`.
fn render_summary(result: &AnalysisResult, filter: &RecordFilter) -> String {
    let records = filter.apply(result.records());
    let target = result.metadata.target_hours;
    let mut out = String::new();

    let _ = writeln!(out, "Weekly attendance (target {})", format_hours(target));
    let _ = writeln!(out, "{}", "=".repeat(60));

    let Some(summary) = ReportSummary::from_records(&records, target) else {
        let _ = writeln!(out, "No records match the current filters.");
        return out;
    };

    for r in &records {
        let _ = writeln!(
            out,
            "{:<20} {}  {:>9}  {:>9}  {:>7}  {}",
            r.employee_id,
            r.week_key(),
            format_hours(r.total_hours),
            format_gap(r.gap_hours),
            format_percent(r.performance_score),
            r.status.as_str().to_uppercase(),
        );
    }

    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(
        out,
        "Employees: {}  Weeks: {}  Records: {}",
        unique_employees(&records).len(),
        unique_weeks(&records).len(),
        summary.total_records
    );
    let _ = writeln!(
        out,
        "Hours: {:.1} / {:.1}  Avg performance: {}",
        summary.total_actual_hours,
        summary.total_target_hours,
        format_percent(summary.avg_performance)
    );
    let _ = writeln!(
        out,
        "Compliant: {} ({})",
        summary.compliant_records,
        format_percent(summary.compliance_rate)
    );

    let meta = &result.metadata;
    if meta.anomalous_sessions > 0 {
        let _ = writeln!(
            out,
            "Warning: {} sessions with implausible hours (see log)",
            meta.anomalous_sessions
        );
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::{AttendancePolicy, ComplianceStatus};
    use tempfile::TempDir;

    fn analyse(csv: &str) -> AnalysisResult {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("badges.csv");
        std::fs::write(&path, csv).unwrap();
        analyze_attendance(&path, &AttendancePolicy::default()).unwrap()
    }

    const TWO_EMPLOYEES: &str = "Date/time,User,Where\n\
        2024-01-01 09:00,alice,In\n\
        2024-01-01 17:00,alice,Out\n\
        2024-01-02 08:00,bob,In\n\
        2024-01-02 12:00,bob,Out\n";

    #[test]
    fn test_user_message_hides_processing_detail() {
        let err = AttendanceError::TimestampParse {
            row: 3,
            value: "x".to_string(),
        };
        assert_eq!(user_message(&err), PROCESSING_FAILURE_MESSAGE);

        let err = AttendanceError::MissingColumns(vec!["User".to_string()]);
        assert_eq!(user_message(&err), "CSV must contain columns: User");
    }

    #[test]
    fn test_render_summary_lists_records_and_totals() {
        let result = analyse(TWO_EMPLOYEES);
        let text = render_summary(&result, &RecordFilter::default());

        assert!(text.starts_with("Weekly attendance (target 40.00h)"));
        assert!(text.contains("alice"));
        assert!(text.contains("+32.00h"));
        assert!(text.contains("Employees: 2  Weeks: 1  Records: 2"));
        assert!(text.contains("Hours: 12.0 / 80.0"));
        assert!(text.contains("Compliant: 0 (0.0%)"));
    }

    #[test]
    fn test_render_summary_applies_filter() {
        let result = analyse(TWO_EMPLOYEES);
        let filter = RecordFilter {
            employee: Some("bob".to_string()),
            ..Default::default()
        };
        let text = render_summary(&result, &filter);
        assert!(!text.contains("alice"));
        assert!(text.contains("Records: 1"));
    }

    #[test]
    fn test_render_summary_no_match() {
        let result = analyse(TWO_EMPLOYEES);
        let filter = RecordFilter {
            status: Some(ComplianceStatus::Met),
            ..Default::default()
        };
        assert!(render_summary(&result, &filter).contains("No records match the current filters."));
    }
}
