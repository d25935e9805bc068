use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{AttendancePolicy, ComplianceStatus, DirectionMatcher, RecordFilter};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Accepted `--view` values.
pub const VIEW_MODES: [&str; 4] = ["table", "summary", "json", "csv"];

/// Accepted `--theme` values.
pub const THEMES: [&str; 4] = ["light", "dark", "classic", "auto"];

/// Weekly attendance compliance from badge event logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "attendance-monitor",
    about = "Weekly attendance compliance from badge event logs",
    version
)]
pub struct Settings {
    /// Badge export CSV file, or a directory of CSV files (defaults to the last input used)
    pub input: Option<PathBuf>,

    /// Output view
    #[arg(long, default_value = "table", value_parser = VIEW_MODES)]
    pub view: String,

    /// Weekly target hours
    #[arg(long, default_value = "40", value_parser = parse_target_hours)]
    pub target_hours: f64,

    /// How badge labels are classified as In / Out
    #[arg(long, value_enum, default_value_t = DirectionMatcher::Token)]
    pub direction_match: DirectionMatcher,

    /// Only show records for this employee
    #[arg(long)]
    pub employee: Option<String>,

    /// Only show the week starting on this Monday (YYYY-MM-DD)
    #[arg(long, value_parser = parse_week)]
    pub week: Option<NaiveDate>,

    /// Only show records with this status
    #[arg(long, value_parser = parse_status)]
    pub status: Option<ComplianceStatus>,

    /// Directory that CSV exports are written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = THEMES)]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_target_hours(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err("target hours must be a positive number".to_string())
    }
}

fn parse_week(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid week `{s}`: {e}"))
}

fn parse_status(s: &str) -> Result<ComplianceStatus, String> {
    ComplianceStatus::parse(s).ok_or_else(|| format!("status must be `met` or `below`, got `{s}`"))
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.attendance-monitor/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_match: Option<DirectionMatcher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".attendance-monitor").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. Filters are per-run and never restored.
        if settings.input.is_none() {
            settings.input = last.input;
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view.filter(|v| VIEW_MODES.contains(&v.as_str())) {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme.filter(|v| THEMES.contains(&v.as_str())) {
                settings.theme = v;
            }
        }
        // NOTE: clap stores the arg id using the *field name* (underscores),
        // not the long-flag spelling (hyphens).
        if !is_arg_explicitly_set(&matches, "target_hours") {
            if let Some(v) = last.target_hours.filter(|v| v.is_finite() && *v > 0.0) {
                settings.target_hours = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "direction_match") {
            if let Some(v) = last.direction_match {
                settings.direction_match = v;
            }
        }
        if settings.export_dir.is_none() {
            settings.export_dir = last.export_dir;
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Pipeline configuration derived from the CLI.
    pub fn policy(&self) -> AttendancePolicy {
        AttendancePolicy {
            target_hours: self.target_hours,
            direction_matcher: self.direction_match,
        }
    }

    /// Record filter derived from `--employee`, `--week` and `--status`.
    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            employee: self.employee.clone(),
            week: self.week,
            status: self.status,
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            input: s.input.clone(),
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            target_hours: Some(s.target_hours),
            direction_match: Some(s.direction_match),
            export_dir: s.export_dir.clone(),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
