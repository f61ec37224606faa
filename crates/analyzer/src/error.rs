use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate sheet, empty column list, bad threshold).
    ConfigValidation(String),
    /// Column reference that is not a spreadsheet column letter.
    InvalidColumnLetter(String),
    /// The workbook has no sheet with this name.
    SheetNotFound(String),
    /// The underlying reader failed on one sheet.
    SheetRead { sheet: String, message: String },
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidColumnLetter(letter) => {
                write!(f, "invalid column letter '{letter}' (expected A, B, ..., Z, AA, ...)")
            }
            Self::SheetNotFound(sheet) => write!(f, "sheet '{sheet}' not found"),
            Self::SheetRead { sheet, message } => {
                write!(f, "sheet '{sheet}': cannot read data: {message}")
            }
        }
    }
}

impl std::error::Error for AnalyzerError {}
