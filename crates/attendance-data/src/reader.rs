//! CSV discovery and loading for badge exports.
//!
//! Accepts a single `.csv` file or a directory tree of them and turns every
//! row into a [`RawRecord`] after checking the header carries the required
//! columns.

use std::io::Read;
use std::path::{Path, PathBuf};

use attendance_core::error::{AttendanceError, Result};
use attendance_core::models::{RawRecord, REQUIRED_COLUMNS};
use tracing::{debug, warn};

/// Counters collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files_read: usize,
    pub rows_read: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_csv(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every badge record reachable from `input`.
///
/// * a file must carry a `.csv` extension;
/// * a directory is scanned recursively and its files are read in path order.
///
/// Records keep file order, then row order, so row numbers in later errors
/// count across the whole batch.
pub fn load_records(input: &Path) -> Result<(Vec<RawRecord>, LoadStats)> {
    if !input.exists() {
        return Err(AttendanceError::DataPathNotFound(input.to_path_buf()));
    }

    let files = if input.is_dir() {
        let files = find_csv_files(input);
        if files.is_empty() {
            return Err(AttendanceError::NoDataFiles(input.to_path_buf()));
        }
        files
    } else if is_csv(input) {
        vec![input.to_path_buf()]
    } else {
        return Err(AttendanceError::UnsupportedFile(input.to_path_buf()));
    };

    let mut records = Vec::new();
    for file in &files {
        let rows = load_csv_file(file)?;
        debug!("File {}: {} rows", file.display(), rows.len());
        records.extend(rows);
    }

    let stats = LoadStats {
        files_read: files.len(),
        rows_read: records.len(),
    };
    debug!(
        "Loaded {} rows from {} files",
        stats.rows_read, stats.files_read
    );

    Ok((records, stats))
}

/// Read one CSV file from disk.
pub fn load_csv_file(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).map_err(|source| AttendanceError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Parse badge rows from any reader.
///
/// Header names and cells are trimmed. Extra columns are ignored; a missing
/// `Where` cell on a short row reads as an empty label.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        warn!("Badge export is missing columns: {}", missing.join(", "));
        return Err(AttendanceError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<RawRecord>() {
        records.push(row?);
    }
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "Date/time,User,Where";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    // ── read_csv ──────────────────────────────────────────────────────────────

    #[test]
    fn test_read_csv_maps_columns() {
        let data = format!("{HEADER}\n2024-01-01 09:00:00,alice,Main In\n");
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, "2024-01-01 09:00:00");
        assert_eq!(records[0].employee_id, "alice");
        assert_eq!(records[0].label, "Main In");
    }

    #[test]
    fn test_read_csv_ignores_extra_columns_and_order() {
        let data = "Where,Badge,User,Date/time\nLobby Out,42,bob,2024-01-01 17:00\n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].employee_id, "bob");
        assert_eq!(records[0].label, "Lobby Out");
    }

    #[test]
    fn test_read_csv_trims_cells_and_headers() {
        let data = " Date/time , User , Where \n 2024-01-01 09:00 , alice , In \n";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].employee_id, "alice");
        assert_eq!(records[0].label, "In");
    }

    #[test]
    fn test_read_csv_missing_columns_listed() {
        let data = "Date/time,Name\n2024-01-01 09:00,alice\n";
        match read_csv(data.as_bytes()).unwrap_err() {
            AttendanceError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["User".to_string(), "Where".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_csv_empty_input_is_missing_columns() {
        let err = read_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, AttendanceError::MissingColumns(ref c) if c.len() == 3));
    }

    #[test]
    fn test_read_csv_header_only_is_empty() {
        assert!(read_csv(HEADER.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_read_csv_short_row_gets_empty_label() {
        let data = format!("{HEADER}\n2024-01-01 09:00,alice\n");
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].label, "");
    }

    // ── find_csv_files ────────────────────────────────────────────────────────

    #[test]
    fn test_find_csv_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("site-b");
        std::fs::create_dir_all(&sub).unwrap();
        write_csv(dir.path(), "c.csv", &[HEADER]);
        write_csv(dir.path(), "a.csv", &[HEADER]);
        write_csv(dir.path(), "notes.txt", &["ignored"]);
        write_csv(&sub, "b.CSV", &[HEADER]);

        let files = find_csv_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], "a.csv");
        assert_eq!(names[1], "c.csv");
    }

    #[test]
    fn test_find_csv_files_nonexistent_path() {
        let files = find_csv_files(Path::new("/tmp/does-not-exist-attendance-test-xyz"));
        assert!(files.is_empty());
    }

    // ── load_records ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_records_single_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "badges.csv",
            &[HEADER, "2024-01-01 09:00,alice,In", "2024-01-01 17:00,alice,Out"],
        );
        let (records, stats) = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(stats, LoadStats { files_read: 1, rows_read: 2 });
    }

    #[test]
    fn test_load_records_directory_concatenates_in_path_order() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "2.csv", &[HEADER, "2024-01-02 09:00,bob,In"]);
        write_csv(dir.path(), "1.csv", &[HEADER, "2024-01-01 09:00,alice,In"]);

        let (records, stats) = load_records(dir.path()).unwrap();
        assert_eq!(stats.files_read, 2);
        assert_eq!(records[0].employee_id, "alice");
        assert_eq!(records[1].employee_id, "bob");
    }

    #[test]
    fn test_load_records_rejects_non_csv_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "badges.xlsx", &[HEADER]);
        assert!(matches!(
            load_records(&path).unwrap_err(),
            AttendanceError::UnsupportedFile(_)
        ));
    }

    #[test]
    fn test_load_records_missing_path() {
        let err = load_records(Path::new("/tmp/does-not-exist-attendance.csv")).unwrap_err();
        assert!(matches!(err, AttendanceError::DataPathNotFound(_)));
    }

    #[test]
    fn test_load_records_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_records(dir.path()).unwrap_err(),
            AttendanceError::NoDataFiles(_)
        ));
    }
}
