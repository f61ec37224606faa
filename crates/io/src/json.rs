// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;

use qatrack_analyzer::WorkbookResult;

use crate::error::IoError;

/// `qa_analysis_20260115_093000.json`
pub fn analysis_file_name(run_at: NaiveDateTime) -> String {
    format!("qa_analysis_{}.json", run_at.format("%Y%m%d_%H%M%S"))
}

pub fn to_string_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write the full per-sheet, per-column analysis of one run.
pub fn write_detailed(path: &Path, result: &WorkbookResult) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| IoError::write(path, e))?;
    info!("wrote detailed analysis to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use qatrack_analyzer::{analyze_workbook_at, AnalysisConfig, CellValue, MemoryWorkbook, SheetGrid};
    use std::fs;
    use tempfile::tempdir;

    fn result() -> WorkbookResult {
        let grid = SheetGrid::new(
            "Auth New OP",
            vec!["ID".into(), "Result".into()],
            vec![
                vec![CellValue::Number(1.0), CellValue::from("Pass")],
                vec![CellValue::Number(2.0), CellValue::from("Fail")],
            ],
        );
        let mut wb = MemoryWorkbook::new("Testing master.xlsx").with_sheet(grid);
        let run_at = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
        analyze_workbook_at(&mut wb, &AnalysisConfig::auto_detect(), run_at)
    }

    #[test]
    fn test_json_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(analysis_file_name(result().run_at));
        assert!(path.ends_with("qa_analysis_20260115_093000.json"));

        write_detailed(&path, &result()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["file_name"], "Testing master.xlsx");
        assert_eq!(parsed["run_at"], "2026-01-15 09:30:00");
        assert_eq!(parsed["mode"], "auto_detect");
        let sheet = &parsed["sheets"][0];
        assert_eq!(sheet["outcome"]["status"], "analyzed");
        assert_eq!(sheet["outcome"]["combined"]["pass_count"], 1);
        assert_eq!(sheet["outcome"]["columns"][0]["column"]["letter"], "B");
    }

    #[test]
    fn write_to_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_detailed(&path, &result()).unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));
    }
}
