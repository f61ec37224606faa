//! Result column identification.
//!
//! Two modes: configured (explicit column letters per sheet) and auto-detect
//! (header keywords, then a value-density heuristic over a sample of cells).

use log::warn;
use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::error::AnalyzerError;
use crate::grid::SheetGrid;

/// Fraction of sampled values that must classify as pass/fail/n-a for a column
/// to count as a result column. Strictly greater-than.
pub const DEFAULT_DENSITY_THRESHOLD: f64 = 0.30;

/// Number of non-empty values sampled per column during auto-detection.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

pub const DEFAULT_HEADER_KEYWORDS: &[&str] = &[
    "result",
    "status",
    "outcome",
    "pass",
    "fail",
    "test result",
    "qa result",
    "test status",
    "qa status",
    "verdict",
    "n/a",
];

/// Tunables for auto-detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    pub density_threshold: f64,
    pub sample_size: usize,
    pub header_keywords: Vec<String>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            density_threshold: DEFAULT_DENSITY_THRESHOLD,
            sample_size: DEFAULT_SAMPLE_SIZE,
            header_keywords: DEFAULT_HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// How a result column was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    Configured,
    HeaderKeyword,
    ValueDensity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedColumn {
    /// Zero-based column index.
    pub index: usize,
    pub letter: String,
    /// Header text at that position.
    pub label: String,
    pub source: ColumnSource,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnResolution {
    pub columns: Vec<ResolvedColumn>,
    pub warnings: Vec<String>,
}

/// Convert a spreadsheet column letter to a zero-based index.
///
/// A -> 0, Z -> 25, AA -> 26, AD -> 29.
pub fn column_letter_to_index(letters: &str) -> Result<usize, AnalyzerError> {
    let trimmed = letters.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AnalyzerError::InvalidColumnLetter(letters.to_string()));
    }
    let mut result: usize = 0;
    for c in trimmed.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add(digit))
            .ok_or_else(|| AnalyzerError::InvalidColumnLetter(letters.to_string()))?;
    }
    Ok(result - 1)
}

/// Convert a zero-based index to a column letter (0 -> A, 26 -> AA).
pub fn column_index_to_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Map configured letters onto the sheet. Out-of-range letters are skipped with a warning.
pub fn resolve_configured(grid: &SheetGrid, letters: &[String]) -> Result<ColumnResolution, AnalyzerError> {
    let mut resolution = ColumnResolution::default();
    let width = grid.total_columns();

    for letter in letters {
        let index = column_letter_to_index(letter)?;
        if index < width {
            resolution.columns.push(ResolvedColumn {
                index,
                letter: letter.trim().to_ascii_uppercase(),
                label: grid.column_label(index),
                source: ColumnSource::Configured,
            });
        } else {
            let msg = format!(
                "column {} (index {index}) out of range - sheet only has {width} columns",
                letter.trim().to_ascii_uppercase()
            );
            warn!("sheet '{}': {msg}", grid.name);
            resolution.warnings.push(msg);
        }
    }

    Ok(resolution)
}

/// Pick result columns by header keyword or by value density.
pub fn detect(grid: &SheetGrid, options: &DetectionOptions) -> ColumnResolution {
    let mut resolution = ColumnResolution::default();

    for index in 0..grid.total_columns() {
        let source = if header_matches(&grid.headers[index], &options.header_keywords) {
            Some(ColumnSource::HeaderKeyword)
        } else if has_result_density(grid, index, options) {
            Some(ColumnSource::ValueDensity)
        } else {
            None
        };

        if let Some(source) = source {
            resolution.columns.push(ResolvedColumn {
                index,
                letter: column_index_to_letter(index),
                label: grid.column_label(index),
                source,
            });
        }
    }

    resolution
}

fn header_matches(header: &str, keywords: &[String]) -> bool {
    let lower = header.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// Share of the first `sample_size` non-empty values that classify as a verdict.
pub fn result_density(grid: &SheetGrid, index: usize, sample_size: usize) -> Option<f64> {
    let sample: Vec<_> = grid
        .column(index)
        .filter(|c| !c.is_blank())
        .take(sample_size)
        .collect();
    if sample.is_empty() {
        return None;
    }
    let matches = sample
        .iter()
        .filter(|c| classify(&c.as_text()).is_valid())
        .count();
    Some(matches as f64 / sample.len() as f64)
}

fn has_result_density(grid: &SheetGrid, index: usize, options: &DetectionOptions) -> bool {
    result_density(grid, index, options.sample_size)
        .is_some_and(|density| density > options.density_threshold)
}
