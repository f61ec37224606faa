use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// The workbook could not be opened (missing, unsupported or corrupt).
    Open { path: PathBuf, message: String },
    /// A file could not be read.
    Read { path: PathBuf, message: String },
    /// A file could not be created or written.
    Write { path: PathBuf, message: String },
    /// Malformed snapshot CSV.
    Csv { path: PathBuf, message: String },
    /// JSON serialization failed.
    Json(String),
    /// No snapshot files (or no rows) matched the history pattern.
    NoHistory { dir: PathBuf, pattern: String },
    /// The history glob pattern is invalid.
    Pattern { pattern: String, message: String },
}

impl IoError {
    pub(crate) fn open(path: &Path, e: impl fmt::Display) -> Self {
        Self::Open { path: path.to_path_buf(), message: e.to_string() }
    }

    pub(crate) fn read(path: &Path, e: impl fmt::Display) -> Self {
        Self::Read { path: path.to_path_buf(), message: e.to_string() }
    }

    pub(crate) fn write(path: &Path, e: impl fmt::Display) -> Self {
        Self::Write { path: path.to_path_buf(), message: e.to_string() }
    }

    pub(crate) fn csv(path: &Path, e: impl fmt::Display) -> Self {
        Self::Csv { path: path.to_path_buf(), message: e.to_string() }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, message } => {
                write!(f, "cannot open workbook {}: {message}", path.display())
            }
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
            Self::Csv { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::NoHistory { dir, pattern } => {
                write!(f, "no snapshot files matching '{pattern}' in {}", dir.display())
            }
            Self::Pattern { pattern, message } => {
                write!(f, "invalid file pattern '{pattern}': {message}")
            }
        }
    }
}

impl std::error::Error for IoError {}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
