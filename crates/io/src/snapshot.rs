// Snapshot CSV persistence and history loading

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{info, warn};

use qatrack_analyzer::{History, SnapshotRow};

use crate::error::IoError;

/// Column order of every snapshot file. Matches the field order of [`SnapshotRow`].
pub const SNAPSHOT_HEADER: &[&str] = &[
    "timestamp",
    "sheet_name",
    "total_rows",
    "total_columns",
    "has_results",
    "pass_count",
    "fail_count",
    "not_available_count",
    "invalid_count",
    "total_tests",
    "total_rows_in_sheet",
    "pass_percentage",
    "fail_percentage",
    "not_available_percentage",
    "configured_column_letter",
    "primary_result_column",
    "all_result_columns",
    "status",
];

/// `qa_results_20260115_093000.csv`
pub fn snapshot_file_name(run_at: NaiveDateTime) -> String {
    format!("qa_results_{}.csv", run_at.format("%Y%m%d_%H%M%S"))
}

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Write rows as CSV. The header is always written, even for zero rows.
pub fn write_rows(rows: &[SnapshotRow], writer: impl Write) -> Result<(), String> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(SNAPSHOT_HEADER)
        .map_err(|e| format!("CSV write error: {e}"))?;
    for row in rows {
        csv.serialize(row).map_err(|e| format!("CSV write error: {e}"))?;
    }
    csv.flush().map_err(|e| format!("CSV flush error: {e}"))?;
    Ok(())
}

pub fn write_snapshot(path: &Path, rows: &[SnapshotRow]) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    write_rows(rows, BufWriter::new(file)).map_err(|e| IoError::write(path, e))?;
    info!("wrote {} snapshot row(s) to {}", rows.len(), path.display());
    Ok(())
}

/// Write every row of a history, in timestamp order, to one file.
pub fn write_combined(path: &Path, history: &History) -> Result<(), IoError> {
    write_snapshot(path, history.rows())
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Parse snapshot CSV. Columns are matched by header name; percentage columns
/// are recomputed from the counts.
pub fn read_rows(reader: impl Read) -> Result<Vec<SnapshotRow>, String> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in csv.deserialize::<SnapshotRow>().enumerate() {
        let row = result.map_err(|e| format!("row {}: {e}", i + 1))?;
        rows.push(row.with_recomputed_percentages());
    }
    Ok(rows)
}

pub fn read_snapshot(path: &Path) -> Result<Vec<SnapshotRow>, IoError> {
    let file = File::open(path).map_err(|e| IoError::read(path, e))?;
    read_rows(file).map_err(|e| IoError::csv(path, e))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedHistory {
    pub history: History,
    /// Files that contributed rows, sorted by name.
    pub files: Vec<PathBuf>,
    /// Files that matched but could not be parsed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Snapshot files in `dir` matching `pattern`, sorted by file name.
pub fn find_snapshots(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, IoError> {
    let full = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join(pattern);
    let full = full.to_string_lossy();
    let entries = glob::glob(&full).map_err(|e| IoError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = entries.filter_map(Result::ok).filter(|p| p.is_file()).collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every matching snapshot into one history.
///
/// An unreadable file is skipped with a warning; the load fails only when no
/// file matches or no rows were loaded at all.
pub fn load_history(dir: &Path, pattern: &str) -> Result<LoadedHistory, IoError> {
    let no_history = || IoError::NoHistory { dir: dir.to_path_buf(), pattern: pattern.to_string() };

    let candidates = find_snapshots(dir, pattern)?;
    if candidates.is_empty() {
        return Err(no_history());
    }

    let mut rows = Vec::new();
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for path in candidates {
        match read_snapshot(&path) {
            Ok(mut loaded) => {
                info!("loaded {} row(s) from {}", loaded.len(), path.display());
                rows.append(&mut loaded);
                files.push(path);
            }
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                skipped.push((path, e.to_string()));
            }
        }
    }

    if rows.is_empty() {
        return Err(no_history());
    }
    Ok(LoadedHistory { history: History::new(rows), files, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use qatrack_analyzer::SheetStatus;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap().and_hms_opt(9, 30, 0).unwrap()
    }

    fn row(day: u32, sheet: &str, pass: i64, fail: i64) -> SnapshotRow {
        SnapshotRow {
            timestamp: at(day),
            sheet_name: sheet.into(),
            total_rows: 12,
            total_columns: 14,
            has_results: true,
            pass_count: pass,
            fail_count: fail,
            not_available_count: 0,
            invalid_count: 12 - pass - fail,
            total_tests: pass + fail,
            total_rows_in_sheet: 12,
            pass_percentage: 0.0,
            fail_percentage: 0.0,
            not_available_percentage: 0.0,
            configured_column_letter: "K + L".into(),
            primary_result_column: "Web + IVR".into(),
            all_result_columns: "Web|IVR".into(),
            status: SheetStatus::Analyzed,
        }
        .with_recomputed_percentages()
    }

    #[test]
    fn header_matches_serialized_fields() {
        let mut out = Vec::new();
        {
            let mut csv = csv::Writer::from_writer(&mut out);
            csv.serialize(row(1, "A", 1, 1)).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, SNAPSHOT_HEADER.join(","));
    }

    #[test]
    fn written_rows_read_back() {
        let rows = vec![row(1, "Auth New OP", 5, 5), row(1, "Conversation Flow_main menu", 7, 1)];
        let mut out = Vec::new();
        write_rows(&rows, &mut out).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("2026-01-01 09:30:00,Auth New OP,12,14,True,5,5,0,2,10,12,50.0,50.0,0.0"));

        let back = read_rows(out.as_slice()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn empty_snapshot_still_has_header() {
        let mut out = Vec::new();
        write_rows(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), SNAPSHOT_HEADER.join(","));
    }

    #[test]
    fn reads_files_without_optional_columns() {
        let csv = "\
timestamp,sheet_name,total_rows,total_columns,has_results,pass_count,fail_count,not_available_count,invalid_count,total_tests,status
2026-01-02 10:00:00,LAP,10,8,true,3,1,0,6,4,analyzed
2026-01-02 10:00:00,WrapUp,4,3,False,0,0,0,0,0,no_results
";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].has_results);
        assert_eq!(rows[0].pass_percentage, 75.0);
        assert_eq!(rows[0].total_rows_in_sheet, 0);
        assert!(!rows[1].has_results);
        assert_eq!(rows[1].status, SheetStatus::NoResults);
    }

    #[test]
    fn malformed_row_reports_position() {
        let csv = "timestamp,sheet_name\nnot-a-date,LAP\n";
        let err = read_rows(csv.as_bytes()).unwrap_err();
        assert!(err.starts_with("row 1:"), "{err}");
    }

    #[test]
    fn file_name_format() {
        assert_eq!(snapshot_file_name(at(15)), "qa_results_20260115_093000.csv");
    }
}
