// Tabular sheet data as handed over by a workbook reader

use std::borrow::Cow;

use crate::columns::column_index_to_letter;
use crate::error::AnalyzerError;

/// A raw scalar read from one spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text the way a spreadsheet displays it: integral numbers without decimals,
    /// booleans as TRUE/FALSE.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Cow::Owned(format!("{}", *n as i64))
                } else {
                    Cow::Owned(format!("{}", n))
                }
            }
            Self::Bool(b) => Cow::Borrowed(if *b { "TRUE" } else { "FALSE" }),
        }
    }

    /// True for empty cells and for text that is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One worksheet: the first row is the header, the rest are data rows.
///
/// Data rows are padded to the header width so every row has `total_columns()` cells.
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(headers.len());
        let mut headers = headers;
        headers.resize(width, String::new());
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { name: name.into(), headers, rows }
    }

    /// Build a grid from raw rows where row 0 is the header.
    pub fn from_rows(name: impl Into<String>, mut raw: Vec<Vec<CellValue>>) -> Self {
        if raw.is_empty() {
            return Self::new(name, Vec::new(), Vec::new());
        }
        let header_row = raw.remove(0);
        let headers = header_row.iter().map(|c| c.as_text().trim().to_string()).collect();
        Self::new(name, headers, raw)
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn total_columns(&self) -> usize {
        self.headers.len()
    }

    /// Header text, or `Column K` when the header cell is blank.
    pub fn column_label(&self, index: usize) -> String {
        match self.headers.get(index).map(|h| h.trim()) {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => format!("Column {}", column_index_to_letter(index)),
        }
    }

    /// All cells of one column, top to bottom (header excluded).
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| row.get(index).unwrap_or(&EMPTY_CELL))
    }
}

/// Read access to a loaded workbook. Implemented by the file readers in `qatrack-io`.
pub trait WorkbookSource {
    /// File name shown in reports.
    fn file_name(&self) -> String;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Load one sheet. Errors are contained per sheet by the workbook analyzer.
    fn read_sheet(&mut self, name: &str) -> Result<SheetGrid, AnalyzerError>;
}

/// Workbook held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    pub file_name: String,
    pub sheets: Vec<SheetGrid>,
}

impl MemoryWorkbook {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), sheets: Vec::new() }
    }

    pub fn with_sheet(mut self, sheet: SheetGrid) -> Self {
        self.sheets.push(sheet);
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn file_name(&self) -> String {
        self.file_name.clone()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<SheetGrid, AnalyzerError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| AnalyzerError::SheetNotFound(name.to_string()))
    }
}
