//! Cross-run aggregation over persisted snapshot rows.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{serialize_timestamp, Totals};
use crate::snapshot::SnapshotRow;

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

/// Totals across all sheets with results at one run timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressPoint {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub totals: Totals,
    pub pass_percentage: f64,
    pub fail_percentage: f64,
    pub not_available_percentage: f64,
}

impl ProgressPoint {
    fn new(timestamp: NaiveDateTime, totals: Totals) -> Self {
        Self {
            timestamp,
            totals,
            pass_percentage: totals.pass_percentage(),
            fail_percentage: totals.fail_percentage(),
            not_available_percentage: totals.not_available_percentage(),
        }
    }
}

/// Signed `last - first` deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Changes {
    pub pass_change: i64,
    pub fail_change: i64,
    pub not_available_change: i64,
    pub total_change: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    #[serde(serialize_with = "serialize_timestamp")]
    pub first_timestamp: NaiveDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_timestamp: NaiveDateTime,
    pub first: Totals,
    pub last: Totals,
    pub changes: Changes,
}

/// Pass percentage of one sheet at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassRateCell {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub pass_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassRateRow {
    pub sheet_name: String,
    /// Sorted by timestamp; timestamps where the sheet had no results are absent.
    pub cells: Vec<PassRateCell>,
}

impl PassRateRow {
    pub fn at(&self, timestamp: NaiveDateTime) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.timestamp == timestamp)
            .map(|c| c.pass_percentage)
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Loaded snapshot rows, sorted by timestamp (stable, so file order breaks ties).
///
/// Every aggregate counts only rows with `has_results`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    rows: Vec<SnapshotRow>,
}

impl History {
    pub fn new(mut rows: Vec<SnapshotRow>) -> Self {
        rows.sort_by_key(|r| r.timestamp);
        Self { rows }
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct run timestamps, ascending.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        let mut out: Vec<NaiveDateTime> = Vec::new();
        for row in &self.rows {
            if out.last() != Some(&row.timestamp) {
                out.push(row.timestamp);
            }
        }
        out
    }

    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.rows.first()?.timestamp, self.rows.last()?.timestamp))
    }

    fn counted(&self) -> impl Iterator<Item = &SnapshotRow> {
        self.rows.iter().filter(|r| r.has_results)
    }

    fn totals_at(&self, timestamp: NaiveDateTime) -> Totals {
        self.counted()
            .filter(|r| r.timestamp == timestamp)
            .map(SnapshotRow::totals)
            .sum()
    }

    /// One point per timestamp at which at least one sheet had results. Runs where
    /// no sheet had results are left out.
    pub fn overall_progress(&self) -> Vec<ProgressPoint> {
        let mut points: Vec<ProgressPoint> = Vec::new();
        for row in self.counted() {
            match points.last_mut() {
                Some(point) if point.timestamp == row.timestamp => {
                    *point = ProgressPoint::new(row.timestamp, point.totals + row.totals());
                }
                _ => points.push(ProgressPoint::new(row.timestamp, row.totals())),
            }
        }
        points
    }

    /// `None` with fewer than two distinct timestamps.
    pub fn compare_first_last(&self) -> Option<Comparison> {
        let timestamps = self.timestamps();
        if timestamps.len() < 2 {
            return None;
        }
        let first_timestamp = *timestamps.first()?;
        let last_timestamp = *timestamps.last()?;
        let first = self.totals_at(first_timestamp);
        let last = self.totals_at(last_timestamp);
        Some(Comparison {
            first_timestamp,
            last_timestamp,
            first,
            last,
            changes: Changes {
                pass_change: last.pass_count - first.pass_count,
                fail_change: last.fail_count - first.fail_count,
                not_available_change: last.not_available_count - first.not_available_count,
                total_change: last.total_tests - first.total_tests,
            },
        })
    }

    /// All rows of the most recent run, including sheets without results.
    pub fn latest_snapshot(&self) -> Vec<&SnapshotRow> {
        match self.rows.last() {
            Some(last) => self.rows.iter().filter(|r| r.timestamp == last.timestamp).collect(),
            None => Vec::new(),
        }
    }

    /// Totals of the most recent run.
    pub fn latest_totals(&self) -> Totals {
        self.rows
            .last()
            .map(|r| self.totals_at(r.timestamp))
            .unwrap_or_default()
    }

    /// One sheet's rows, ascending by timestamp.
    pub fn sheet_series(&self, sheet_name: &str) -> Vec<&SnapshotRow> {
        self.rows.iter().filter(|r| r.sheet_name == sheet_name).collect()
    }

    /// Distinct sheet names, sorted.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.sheet_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Pass percentage per sheet per timestamp, over rows with results. Sheets are
    /// ordered by their pass rate at the latest such timestamp (highest first);
    /// sheets absent from that run go last. Ties are broken by name. When a sheet
    /// appears twice at one timestamp the first row is kept.
    pub fn pass_rate_matrix(&self) -> Vec<PassRateRow> {
        let mut matrix: Vec<PassRateRow> = Vec::new();
        for row in self.counted() {
            let cell = PassRateCell { timestamp: row.timestamp, pass_percentage: row.pass_percentage };
            match matrix.iter_mut().find(|m| m.sheet_name == row.sheet_name) {
                Some(entry) => {
                    if entry.at(row.timestamp).is_none() {
                        entry.cells.push(cell);
                    }
                }
                None => matrix.push(PassRateRow { sheet_name: row.sheet_name.clone(), cells: vec![cell] }),
            }
        }

        let Some(latest) = self.counted().last().map(|r| r.timestamp) else {
            return matrix;
        };
        matrix.sort_by(|a, b| match (a.at(latest), b.at(latest)) {
            (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.sheet_name.cmp(&b.sheet_name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.sheet_name.cmp(&b.sheet_name),
        });
        matrix
    }
}

impl FromIterator<SnapshotRow> for History {
    fn from_iter<I: IntoIterator<Item = SnapshotRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SheetStatus;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    fn row(day: u32, sheet: &str, pass: i64, fail: i64, na: i64) -> SnapshotRow {
        SnapshotRow {
            timestamp: at(day),
            sheet_name: sheet.into(),
            total_rows: 20,
            total_columns: 12,
            has_results: true,
            pass_count: pass,
            fail_count: fail,
            not_available_count: na,
            invalid_count: 0,
            total_tests: pass + fail + na,
            total_rows_in_sheet: 20,
            pass_percentage: 0.0,
            fail_percentage: 0.0,
            not_available_percentage: 0.0,
            configured_column_letter: "K".into(),
            primary_result_column: "Result".into(),
            all_result_columns: "Result".into(),
            status: SheetStatus::Analyzed,
        }
        .with_recomputed_percentages()
    }

    fn no_results(day: u32, sheet: &str) -> SnapshotRow {
        SnapshotRow {
            has_results: false,
            pass_count: 99,
            total_tests: 99,
            status: SheetStatus::NoResults,
            ..row(day, sheet, 0, 0, 0)
        }
    }

    #[test]
    fn first_last_comparison() {
        let history = History::new(vec![
            row(2, "Auth New OP", 8, 2, 0),
            row(1, "Auth New OP", 5, 5, 0),
        ]);
        let cmp = history.compare_first_last().unwrap();
        assert_eq!(cmp.first_timestamp, at(1));
        assert_eq!(cmp.last_timestamp, at(2));
        assert_eq!(cmp.changes.pass_change, 3);
        assert_eq!(cmp.changes.fail_change, -3);
        assert_eq!(cmp.changes.not_available_change, 0);
        assert_eq!(cmp.changes.total_change, 0);
    }

    #[test]
    fn single_snapshot_has_no_comparison() {
        let history = History::new(vec![row(1, "A", 1, 0, 0), row(1, "B", 0, 1, 0)]);
        assert!(history.compare_first_last().is_none());
        assert_eq!(history.overall_progress().len(), 1);
        assert_eq!(history.time_range(), Some((at(1), at(1))));
    }

    #[test]
    fn rows_without_results_are_excluded() {
        let history = History::new(vec![
            row(1, "A", 3, 1, 0),
            no_results(1, "B"),
            row(1, "C", 1, 0, 1),
        ]);
        let progress = history.overall_progress();
        assert_eq!(progress.len(), 1);
        let p = &progress[0];
        assert_eq!(p.totals.pass_count, 4);
        assert_eq!(p.totals.fail_count, 1);
        assert_eq!(p.totals.not_available_count, 1);
        assert_eq!(p.totals.total_tests, 6);
        assert_eq!(p.pass_percentage, 66.67);
    }

    #[test]
    fn zero_total_reports_zero_percentages() {
        let history = History::new(vec![no_results(1, "A"), row(1, "B", 0, 0, 0)]);
        let p = history.overall_progress()[0];
        assert_eq!(p.totals.total_tests, 0);
        assert_eq!(p.pass_percentage, 0.0);
        assert_eq!(p.fail_percentage, 0.0);
        assert_eq!(p.not_available_percentage, 0.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let history = History::new(vec![row(1, "A", 5, 5, 0), row(2, "A", 8, 2, 0), row(2, "B", 1, 1, 1)]);
        assert_eq!(history.overall_progress(), history.overall_progress());
        assert_eq!(history.compare_first_last(), history.compare_first_last());
        assert_eq!(history.pass_rate_matrix(), history.pass_rate_matrix());
    }

    #[test]
    fn latest_snapshot_and_series() {
        let history = History::new(vec![
            row(3, "A", 9, 1, 0),
            row(1, "A", 5, 5, 0),
            no_results(3, "B"),
            row(2, "A", 7, 3, 0),
        ]);
        let latest: Vec<&str> = history.latest_snapshot().iter().map(|r| r.sheet_name.as_str()).collect();
        assert_eq!(latest, vec!["A", "B"]);
        assert_eq!(history.latest_totals().pass_count, 9);

        let series: Vec<i64> = history.sheet_series("A").iter().map(|r| r.pass_count).collect();
        assert_eq!(series, vec![5, 7, 9]);
        assert!(history.sheet_series("missing").is_empty());
        assert_eq!(history.sheet_names(), vec!["A", "B"]);
        assert_eq!(history.timestamps(), vec![at(1), at(2), at(3)]);
    }

    #[test]
    fn pass_rate_matrix_orders_by_latest_rate() {
        let history = History::new(vec![
            row(1, "Low", 9, 1, 0),
            row(2, "Low", 1, 9, 0),
            row(1, "High", 1, 1, 0),
            row(2, "High", 10, 0, 0),
            no_results(2, "Empty"),
        ]);
        let matrix = history.pass_rate_matrix();
        let names: Vec<&str> = matrix.iter().map(|m| m.sheet_name.as_str()).collect();
        assert_eq!(names, vec!["High", "Low"]);
        assert_eq!(matrix[0].at(at(2)), Some(100.0));
        assert_eq!(matrix[1].at(at(1)), Some(90.0));
        assert_eq!(matrix[1].at(at(3)), None);
    }

    #[test]
    fn pass_rate_matrix_puts_sheets_missing_from_latest_run_last() {
        let history = History::new(vec![
            row(1, "Gone", 95, 5, 0),
            row(1, "Here", 10, 90, 0),
            row(2, "Here", 50, 50, 0),
            no_results(2, "Gone"),
        ]);
        let matrix = history.pass_rate_matrix();
        let names: Vec<&str> = matrix.iter().map(|m| m.sheet_name.as_str()).collect();
        assert_eq!(names, vec!["Here", "Gone"]);
        assert_eq!(matrix[1].at(at(1)), Some(95.0));
        assert_eq!(matrix[1].at(at(2)), None);
    }

    #[test]
    fn pass_rate_matrix_keeps_first_duplicate() {
        let history = History::new(vec![row(1, "A", 10, 0, 0), row(1, "A", 0, 10, 0)]);
        let matrix = history.pass_rate_matrix();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].cells.len(), 1);
        assert_eq!(matrix[0].at(at(1)), Some(100.0));
    }

    #[test]
    fn runs_without_results_are_not_progress_points() {
        let history = History::new(vec![
            row(1, "A", 5, 5, 0),
            no_results(2, "A"),
            row(3, "A", 8, 2, 0),
        ]);
        let stamps: Vec<NaiveDateTime> = history.overall_progress().iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![at(1), at(3)]);
        assert_eq!(history.timestamps(), vec![at(1), at(2), at(3)]);
    }

    #[test]
    fn empty_history() {
        let history = History::default();
        assert!(history.is_empty());
        assert!(history.time_range().is_none());
        assert!(history.latest_snapshot().is_empty());
        assert!(history.overall_progress().is_empty());
        assert_eq!(history.latest_totals(), Totals::default());
    }
}
