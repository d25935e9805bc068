//! Main analysis pipeline for the attendance monitor.
//!
//! Composes CSV loading, session extraction and weekly aggregation, returning
//! an [`AnalysisResult`] ready for the UI and export layers.

use std::path::Path;

use attendance_core::calculations::{unique_employees, unique_weeks, ReportSummary};
use attendance_core::error::Result;
use attendance_core::models::{AttendancePolicy, ProcessOutcome, RawRecord, WeeklyRecord};
use chrono::Local;
use tracing::info;

use crate::aggregator::WeeklyAggregator;
use crate::extractor::{ExtractionStats, SessionExtractor};
use crate::reader::load_records;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    pub files_read: usize,
    pub rows_read: usize,
    /// Rows whose timestamp parsed (all of them, or the run fails).
    pub events_parsed: usize,
    pub weekend_events_dropped: usize,
    pub undirected_events: usize,
    pub incomplete_days: usize,
    pub sessions_built: usize,
    /// Sessions below zero or above 24 hours.
    pub anomalous_sessions: usize,
    pub target_hours: f64,
    /// Wall-clock seconds spent reading the CSV input.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent building sessions and weekly records.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_attendance`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub outcome: ProcessOutcome,
    /// `None` when no records were produced.
    pub summary: Option<ReportSummary>,
    pub employees: Vec<String>,
    /// Week starts as `YYYY-MM-DD`.
    pub weeks: Vec<String>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn records(&self) -> &[WeeklyRecord] {
        self.outcome.records()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Turn raw badge rows into weekly records.
///
/// Pure: the same rows and policy always give the same outcome.
pub fn process(records: &[RawRecord], policy: &AttendancePolicy) -> Result<ProcessOutcome> {
    process_with_stats(records, policy).map(|(outcome, _)| outcome)
}

/// Run the full pipeline over a CSV file or directory.
///
/// 1. Load and validate rows via [`load_records`].
/// 2. Parse timestamps, extract daily sessions.
/// 3. Aggregate into weekly records.
/// 4. Summarise.
pub fn analyze_attendance(input: &Path, policy: &AttendancePolicy) -> Result<AnalysisResult> {
    info!(
        "Analysing {} (target {}h, {} matching)",
        input.display(),
        policy.target_hours,
        policy.direction_matcher.as_str()
    );

    // ── Step 1: Load rows ─────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let (rows, load_stats) = load_records(input)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2-3: Sessions and weeks ──────────────────────────────────────────
    let transform_start = std::time::Instant::now();
    let (outcome, stats) = process_with_stats(&rows, policy)?;
    let transform_time = transform_start.elapsed().as_secs_f64();

    // ── Step 4: Summary ───────────────────────────────────────────────────────
    let records = outcome.records();
    let summary = ReportSummary::from_records(records, policy.target_hours);

    let metadata = AnalysisMetadata {
        generated_at: Local::now().to_rfc3339(),
        files_read: load_stats.files_read,
        rows_read: load_stats.rows_read,
        events_parsed: stats.events_seen,
        weekend_events_dropped: stats.weekend_events,
        undirected_events: stats.undirected_events,
        incomplete_days: stats.incomplete_days,
        sessions_built: stats.sessions,
        anomalous_sessions: stats.anomalous_sessions,
        target_hours: policy.target_hours,
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    info!(
        "Produced {} weekly records from {} sessions",
        records.len(),
        stats.sessions
    );

    Ok(AnalysisResult {
        employees: unique_employees(records),
        weeks: unique_weeks(records),
        summary,
        outcome,
        metadata,
    })
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn process_with_stats(
    records: &[RawRecord],
    policy: &AttendancePolicy,
) -> Result<(ProcessOutcome, ExtractionStats)> {
    let events = SessionExtractor::parse_records(records)?;
    let (sessions, stats) = SessionExtractor::new(policy.direction_matcher).extract(&events);
    let outcome = WeeklyAggregator::new(policy.target_hours).aggregate(&sessions);
    Ok((outcome, stats))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
