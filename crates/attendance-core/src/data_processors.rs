use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

use crate::error::{AttendanceError, Result};
use crate::models::{Direction, DirectionMatcher, RawEvent, RawRecord};

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses the date-time cells found in badge exports.
///
/// Offsets are dropped rather than converted: every timestamp in a batch is
/// taken to be wall-clock time in the same zone.
pub struct TimestampProcessor;

impl TimestampProcessor {
    const DATETIME_FORMATS: &'static [&'static str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %I:%M %p",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
    ];

    const DATE_FORMATS: &'static [&'static str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

    /// Attempt to parse a timestamp cell.
    ///
    /// Handles RFC 3339 (with `Z` or numeric offset), RFC 2822, ISO-like
    /// `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]`, month-first US dates with 24h or
    /// AM/PM clocks, dotted day-first dates, and bare dates (midnight).
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.naive_local());
        }

        for fmt in Self::DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        for fmt in Self::DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        None
    }

    /// Parse every record of a batch, failing on the first bad timestamp.
    ///
    /// Row numbers in the error are 1-based positions within `records`.
    pub fn parse_records(records: &[RawRecord]) -> Result<Vec<RawEvent>> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| match Self::parse(&record.timestamp) {
                Some(timestamp) => Ok(RawEvent {
                    employee_id: record.employee_id.clone(),
                    timestamp,
                    label: record.label.clone(),
                }),
                None => {
                    warn!(
                        "TimestampProcessor: could not parse timestamp \"{}\" on row {}",
                        record.timestamp,
                        idx + 1
                    );
                    Err(AttendanceError::TimestampParse {
                        row: idx + 1,
                        value: record.timestamp.clone(),
                    })
                }
            })
            .collect()
    }
}

// ── DirectionClassifier ───────────────────────────────────────────────────────

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(in|out)\b").expect("regex is valid"))
}

/// Derives a badge [`Direction`] from a free-text label.
pub struct DirectionClassifier;

impl DirectionClassifier {
    /// Classify `label` under `matcher`.
    ///
    /// When a label carries both an in and an out marker, `In` wins.
    pub fn classify(label: &str, matcher: DirectionMatcher) -> Option<Direction> {
        match matcher {
            DirectionMatcher::Substring => {
                if label.contains("In") {
                    Some(Direction::In)
                } else if label.contains("Out") {
                    Some(Direction::Out)
                } else {
                    None
                }
            }
            DirectionMatcher::Token => {
                let mut found_out = false;
                for cap in token_regex().captures_iter(label) {
                    if cap[1].eq_ignore_ascii_case("in") {
                        return Some(Direction::In);
                    }
                    found_out = true;
                }
                found_out.then_some(Direction::Out)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
