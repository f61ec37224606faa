use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::classify::Classification;
use crate::columns::ResolvedColumn;
use crate::TIMESTAMP_FORMAT;

// ---------------------------------------------------------------------------
// Column counts
// ---------------------------------------------------------------------------

/// Classification counts over one column (or several, combined).
///
/// Invariant: `pass + fail + not_available + invalid == total_rows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnResult {
    pub pass_count: usize,
    pub fail_count: usize,
    pub not_available_count: usize,
    pub invalid_count: usize,
    pub total_rows: usize,
}

impl ColumnResult {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Pass => self.pass_count += 1,
            Classification::Fail => self.fail_count += 1,
            Classification::NotAvailable => self.not_available_count += 1,
            Classification::Invalid => self.invalid_count += 1,
        }
        self.total_rows += 1;
    }

    /// Valid total: pass + fail + not_available. Invalid cells never count.
    pub fn total(&self) -> usize {
        self.pass_count + self.fail_count + self.not_available_count
    }

    pub fn totals(&self) -> Totals {
        Totals {
            pass_count: self.pass_count as i64,
            fail_count: self.fail_count as i64,
            not_available_count: self.not_available_count as i64,
            total_tests: self.total() as i64,
        }
    }
}

impl FromIterator<Classification> for ColumnResult {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        let mut result = Self::default();
        for c in iter {
            result.record(c);
        }
        result
    }
}

impl Add for ColumnResult {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for ColumnResult {
    fn add_assign(&mut self, rhs: Self) {
        self.pass_count += rhs.pass_count;
        self.fail_count += rhs.fail_count;
        self.not_available_count += rhs.not_available_count;
        self.invalid_count += rhs.invalid_count;
        self.total_rows += rhs.total_rows;
    }
}

impl Sum for ColumnResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a ColumnResult> for ColumnResult {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// ---------------------------------------------------------------------------
// Totals + percentages
// ---------------------------------------------------------------------------

/// Summed counts used by workbook and history aggregates. Signed so that deltas
/// share the type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub pass_count: i64,
    pub fail_count: i64,
    pub not_available_count: i64,
    pub total_tests: i64,
}

impl Totals {
    pub fn pass_percentage(&self) -> f64 {
        percentage(self.pass_count, self.total_tests)
    }

    pub fn fail_percentage(&self) -> f64 {
        percentage(self.fail_count, self.total_tests)
    }

    pub fn not_available_percentage(&self) -> f64 {
        percentage(self.not_available_count, self.total_tests)
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            pass_count: self.pass_count + rhs.pass_count,
            fail_count: self.fail_count + rhs.fail_count,
            not_available_count: self.not_available_count + rhs.not_available_count,
            total_tests: self.total_tests + rhs.total_tests,
        }
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// `count / total * 100` rounded to 2 decimals; 0 when `total` is 0.
pub fn percentage(count: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Sheet results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: ResolvedColumn,
    pub result: ColumnResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetAnalysis {
    pub columns: Vec<ColumnSummary>,
    /// Elementwise sum over `columns`.
    pub combined: ColumnResult,
    pub primary_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetOutcome {
    Analyzed(SheetAnalysis),
    NoResults,
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    Analyzed,
    NoResults,
    Error,
}

impl std::fmt::Display for SheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyzed => write!(f, "analyzed"),
            Self::NoResults => write!(f, "no_results"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One sheet's outcome for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetResult {
    pub sheet_name: String,
    pub total_rows: usize,
    pub total_columns: usize,
    /// Letters from the sheet configuration; empty in auto-detect mode.
    pub configured_letters: Vec<String>,
    pub warnings: Vec<String>,
    pub outcome: SheetOutcome,
}

impl SheetResult {
    pub fn error(sheet_name: impl Into<String>, configured_letters: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            total_rows: 0,
            total_columns: 0,
            configured_letters,
            warnings: Vec::new(),
            outcome: SheetOutcome::Error { message: message.into() },
        }
    }

    pub fn has_results(&self) -> bool {
        matches!(self.outcome, SheetOutcome::Analyzed(_))
    }

    pub fn status(&self) -> SheetStatus {
        match self.outcome {
            SheetOutcome::Analyzed(_) => SheetStatus::Analyzed,
            SheetOutcome::NoResults => SheetStatus::NoResults,
            SheetOutcome::Error { .. } => SheetStatus::Error,
        }
    }

    pub fn analysis(&self) -> Option<&SheetAnalysis> {
        match &self.outcome {
            SheetOutcome::Analyzed(a) => Some(a),
            _ => None,
        }
    }

    /// Combined counts, present only when the sheet has results.
    pub fn summary(&self) -> Option<&ColumnResult> {
        self.analysis().map(|a| &a.combined)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            SheetOutcome::Error { message } => Some(message),
            _ => None,
        }
    }

    /// `K` or `K + L`; `None` when the sheet was auto-detected.
    pub fn configured_column_letter(&self) -> Option<String> {
        if self.configured_letters.is_empty() {
            None
        } else {
            Some(self.configured_letters.join(" + "))
        }
    }

    pub fn result_column_labels(&self) -> Vec<String> {
        self.analysis()
            .map(|a| a.columns.iter().map(|c| c.column.label.clone()).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Workbook results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Configured,
    AutoDetect,
}

/// One run over one workbook. Never mutated after the analyzer returns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookResult {
    pub file_name: String,
    /// Number of sheets in the workbook (analyzed or not).
    pub sheet_count: usize,
    pub sheet_names: Vec<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub run_at: NaiveDateTime,
    pub mode: AnalysisMode,
    /// Sheets configured (or present, in auto-detect mode) in analysis order.
    pub configured_sheet_count: usize,
    pub sheets: Vec<SheetResult>,
    /// Workbook-level warnings, e.g. configured sheets missing from the file.
    pub warnings: Vec<String>,
}

impl WorkbookResult {
    pub fn sheet(&self, name: &str) -> Option<&SheetResult> {
        self.sheets.iter().find(|s| s.sheet_name == name)
    }

    pub fn sheets_with_results(&self) -> impl Iterator<Item = &SheetResult> {
        self.sheets.iter().filter(|s| s.has_results())
    }

    /// Overall totals across sheets with results.
    pub fn totals(&self) -> Totals {
        self.sheets_with_results()
            .filter_map(SheetResult::summary)
            .map(ColumnResult::totals)
            .sum()
    }
}

pub(crate) fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(p: usize, f: usize, na: usize, inv: usize) -> ColumnResult {
        ColumnResult {
            pass_count: p,
            fail_count: f,
            not_available_count: na,
            invalid_count: inv,
            total_rows: p + f + na + inv,
        }
    }

    #[test]
    fn record_keeps_invariant() {
        let r: ColumnResult = [
            Classification::Pass,
            Classification::Pass,
            Classification::Fail,
            Classification::Invalid,
            Classification::NotAvailable,
        ]
        .into_iter()
        .collect();
        assert_eq!(r, counts(2, 1, 1, 1));
        assert_eq!(r.total(), 4);
        assert_eq!(r.pass_count + r.fail_count + r.not_available_count + r.invalid_count, r.total_rows);
    }

    #[test]
    fn elementwise_sum() {
        let k = counts(3, 1, 0, 6);
        let l = counts(2, 2, 1, 5);
        let combined: ColumnResult = [k, l].iter().sum();
        assert_eq!(combined, counts(5, 3, 1, 11));
        assert_eq!(k + l, l + k);
    }

    #[test]
    fn percentages_round_and_guard_zero() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 0), 0.0);
        let t = Totals { pass_count: 6, fail_count: 3, not_available_count: 0, total_tests: 9 };
        assert_eq!(t.pass_percentage(), 66.67);
        assert_eq!(t.fail_percentage(), 33.33);
        assert_eq!(t.not_available_percentage(), 0.0);
    }

    #[test]
    fn sheet_result_accessors() {
        let err = SheetResult::error("Broken", vec!["K".into(), "L".into()], "bad zip");
        assert!(!err.has_results());
        assert_eq!(err.status(), SheetStatus::Error);
        assert_eq!(err.error_message(), Some("bad zip"));
        assert_eq!(err.configured_column_letter().as_deref(), Some("K + L"));
        assert!(err.summary().is_none());
        assert!(err.result_column_labels().is_empty());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let err = SheetResult::error("Broken", vec![], "bad zip");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["outcome"]["status"], "error");
        assert_eq!(json["outcome"]["message"], "bad zip");
    }
}
