use std::path::PathBuf;
use thiserror::Error;

/// User-facing message for any input that could not be turned into weekly
/// records.
pub const PROCESSING_FAILURE_MESSAGE: &str =
    "Unable to process attendance data. Please check the file format.";

/// All errors produced by the attendance monitor.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A timestamp cell did not match any recognised format.
    ///
    /// `row` is the 1-based data row (header excluded) across the batch.
    #[error("Invalid timestamp format on row {row}: {value}")]
    TimestampParse { row: usize, value: String },

    /// The CSV header lacks one or more required columns.
    #[error("CSV must contain columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The CSV document itself is malformed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// The input file is not a `.csv` file.
    #[error("Only CSV files are allowed: {0}")]
    UnsupportedFile(PathBuf),

    /// An export was requested but no record survived filtering.
    #[error("No data to export")]
    NothingToExport,

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AttendanceError {
    /// Whether this error means the input was readable as a table but the
    /// attendance pipeline could not process it.
    ///
    /// Hosts report these with [`PROCESSING_FAILURE_MESSAGE`], the same text
    /// used for a file without any complete day.
    pub fn is_processing_failure(&self) -> bool {
        matches!(self, AttendanceError::TimestampParse { .. })
    }
}

/// Convenience alias used throughout the attendance crates.
pub type Result<T> = std::result::Result<T, AttendanceError>;
