// Excel workbook reading (xlsx, xlsm, xls, xlsb, ods)

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate};
use log::debug;

use qatrack_analyzer::{AnalyzerError, CellValue, SheetGrid, WorkbookSource};

use crate::error::IoError;

/// A workbook opened from disk. Sheets are read lazily, one at a time.
pub struct XlsxWorkbook {
    path: PathBuf,
    sheet_names: Vec<String>,
    inner: Sheets<BufReader<File>>,
}

/// Open a workbook. Fails when the file is missing, unreadable or not a spreadsheet.
pub fn open(path: &Path) -> Result<XlsxWorkbook, IoError> {
    let inner: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::open(path, e))?;
    let sheet_names = inner.sheet_names().to_vec();
    debug!("opened {} ({} sheets)", path.display(), sheet_names.len());
    Ok(XlsxWorkbook { path: path.to_path_buf(), sheet_names, inner })
}

impl WorkbookSource for XlsxWorkbook {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.clone()
    }

    fn read_sheet(&mut self, name: &str) -> Result<SheetGrid, AnalyzerError> {
        if !self.sheet_names.iter().any(|s| s == name) {
            return Err(AnalyzerError::SheetNotFound(name.to_string()));
        }
        let range = self.inner.worksheet_range(name).map_err(|e| AnalyzerError::SheetRead {
            sheet: name.to_string(),
            message: e.to_string(),
        })?;

        // Range start offset (data may not begin at A1). Pad so that column
        // letters and the header row stay absolute.
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let (start_row, start_col) = (start_row as usize, start_col as usize);

        let mut raw: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            let mut cells = vec![CellValue::Empty; start_col];
            cells.extend(row.iter().map(cell_value));
            raw.push(cells);
        }

        let grid = SheetGrid::from_rows(name, raw);
        debug!(
            "sheet '{}': {} data rows x {} columns",
            name,
            grid.total_rows(),
            grid.total_columns()
        );
        Ok(grid)
    }
}

/// Convert a calamine cell into the analyzer's cell model.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Rendered as the sheet shows it: #N/A, #DIV/0!, ...
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::DateTime(dt) => CellValue::Text(excel_serial_to_iso(dt.as_f64())),
        Data::DateTimeIso(s) => CellValue::from(s.as_str()),
        Data::DurationIso(s) => CellValue::from(s.as_str()),
    }
}

/// Render an Excel serial date (1900 system) as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
fn excel_serial_to_iso(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return serial.to_string();
    };
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let Some(dt) = epoch
        .checked_add_signed(Duration::days(days as i64))
        .and_then(|d| d.checked_add_signed(Duration::seconds(seconds)))
    else {
        return serial.to_string();
    };
    if seconds == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
