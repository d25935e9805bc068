use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Paths of the per-user application directories.
#[derive(Debug, Clone, PartialEq)]
pub struct AppDirs {
    pub root: PathBuf,
    pub logs: PathBuf,
    pub exports: PathBuf,
}

/// Ensure the standard `~/.attendance-monitor/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.attendance-monitor/`
/// - `~/.attendance-monitor/logs/`
/// - `~/.attendance-monitor/exports/`
pub fn ensure_directories() -> anyhow::Result<AppDirs> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

/// Same as [`ensure_directories`] but rooted at `home`.
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<AppDirs> {
    let root = home.join(".attendance-monitor");
    let dirs = AppDirs {
        logs: root.join("logs"),
        exports: root.join("exports"),
        root,
    };
    std::fs::create_dir_all(&dirs.logs)?;
    std::fs::create_dir_all(&dirs.exports)?;
    Ok(dirs)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG/INFO/WARNING/ERROR/CRITICAL` name to an `EnvFilter` directive.
///
/// Unrecognised names are passed through so that full directives such as
/// `attendance_data=debug` keep working.
pub fn level_directive(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, records are appended to that file (no ANSI colours)
/// and nothing is written to stderr, which the table view owns.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
