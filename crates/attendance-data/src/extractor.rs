//! Badge events to daily sessions.
//!
//! Weekend events are discarded, the rest are classified In/Out and grouped
//! per (employee, date). A group with at least one of each direction becomes
//! one [`DailySession`] spanning the earliest In to the latest Out.

use std::collections::BTreeMap;

use attendance_core::data_processors::{DirectionClassifier, TimestampProcessor};
use attendance_core::error::Result;
use attendance_core::formatting::format_duration;
use attendance_core::models::{DailySession, Direction, DirectionMatcher, RawEvent, RawRecord};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use tracing::{debug, warn};

// ── ExtractionStats ───────────────────────────────────────────────────────────

/// Counters for what the extractor kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExtractionStats {
    pub events_seen: usize,
    pub weekend_events: usize,
    pub undirected_events: usize,
    /// (employee, date) groups missing either an In or an Out.
    pub incomplete_days: usize,
    pub sessions: usize,
    pub anomalous_sessions: usize,
}

/// Earliest In and latest Out seen for one (employee, date).
#[derive(Debug, Default)]
struct DayBounds {
    first_in: Option<NaiveDateTime>,
    last_out: Option<NaiveDateTime>,
}

impl DayBounds {
    fn add(&mut self, direction: Direction, ts: NaiveDateTime) {
        match direction {
            Direction::In => {
                self.first_in = Some(self.first_in.map_or(ts, |cur| cur.min(ts)));
            }
            Direction::Out => {
                self.last_out = Some(self.last_out.map_or(ts, |cur| cur.max(ts)));
            }
        }
    }
}

// ── SessionExtractor ──────────────────────────────────────────────────────────

/// Resolves raw badge events into one session per employee and weekday.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionExtractor {
    matcher: DirectionMatcher,
}

impl SessionExtractor {
    pub fn new(matcher: DirectionMatcher) -> Self {
        Self { matcher }
    }

    /// Parse the timestamp of every record; the first bad cell fails the batch.
    pub fn parse_records(records: &[RawRecord]) -> Result<Vec<RawEvent>> {
        TimestampProcessor::parse_records(records)
    }

    /// Build sessions sorted by (employee, date).
    pub fn extract(&self, events: &[RawEvent]) -> (Vec<DailySession>, ExtractionStats) {
        let mut stats = ExtractionStats {
            events_seen: events.len(),
            ..Default::default()
        };
        let mut days: BTreeMap<(String, NaiveDate), DayBounds> = BTreeMap::new();

        for event in events {
            let date = event.timestamp.date();
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                stats.weekend_events += 1;
                continue;
            }

            let Some(direction) = DirectionClassifier::classify(&event.label, self.matcher)
            else {
                stats.undirected_events += 1;
                continue;
            };

            days.entry((event.employee_id.clone(), date))
                .or_default()
                .add(direction, event.timestamp);
        }

        let mut sessions = Vec::with_capacity(days.len());
        for ((employee_id, date), bounds) in days {
            let (Some(check_in), Some(check_out)) = (bounds.first_in, bounds.last_out) else {
                debug!("Skipping incomplete day for {} on {}", employee_id, date);
                stats.incomplete_days += 1;
                continue;
            };

            let session = DailySession::new(employee_id, date, check_in, check_out);
            if let Some(anomaly) = session.anomaly() {
                warn!(
                    "Implausible session for {} on {}: {} ({:?})",
                    session.employee_id,
                    session.date,
                    format_duration(session.hours_worked),
                    anomaly
                );
                stats.anomalous_sessions += 1;
            }
            sessions.push(session);
        }

        stats.sessions = sessions.len();
        debug!(
            "Extracted {} sessions from {} events ({} weekend, {} undirected, {} incomplete days)",
            stats.sessions,
            stats.events_seen,
            stats.weekend_events,
            stats.undirected_events,
            stats.incomplete_days
        );

        (sessions, stats)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
