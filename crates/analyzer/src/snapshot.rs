//! Persisted snapshot rows: one row per sheet per run.
//!
//! The column order and names are a stable contract with downstream consumers
//! (progress reports, charting, drive uploads). Do not reorder fields.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::{percentage, SheetResult, SheetStatus, Totals, WorkbookResult};
use crate::TIMESTAMP_FORMAT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(serialize_with = "crate::model::serialize_timestamp", deserialize_with = "de_timestamp")]
    pub timestamp: NaiveDateTime,
    pub sheet_name: String,
    pub total_rows: usize,
    pub total_columns: usize,
    #[serde(serialize_with = "ser_bool", deserialize_with = "de_bool")]
    pub has_results: bool,
    pub pass_count: i64,
    pub fail_count: i64,
    pub not_available_count: i64,
    pub invalid_count: i64,
    pub total_tests: i64,
    /// Row count behind the summary (summed across combined columns).
    #[serde(default)]
    pub total_rows_in_sheet: usize,
    #[serde(default)]
    pub pass_percentage: f64,
    #[serde(default)]
    pub fail_percentage: f64,
    #[serde(default)]
    pub not_available_percentage: f64,
    #[serde(default)]
    pub configured_column_letter: String,
    #[serde(default)]
    pub primary_result_column: String,
    /// Result column labels joined with `|`.
    #[serde(default)]
    pub all_result_columns: String,
    pub status: SheetStatus,
}

/// Separator for `all_result_columns`.
pub const COLUMN_SEPARATOR: &str = "|";

impl SnapshotRow {
    pub fn from_sheet(timestamp: NaiveDateTime, sheet: &SheetResult) -> Self {
        let configured_column_letter = sheet.configured_column_letter().unwrap_or_default();

        match sheet.analysis() {
            Some(analysis) => {
                let s = &analysis.combined;
                let totals = s.totals();
                Self {
                    timestamp,
                    sheet_name: sheet.sheet_name.clone(),
                    total_rows: sheet.total_rows,
                    total_columns: sheet.total_columns,
                    has_results: true,
                    pass_count: totals.pass_count,
                    fail_count: totals.fail_count,
                    not_available_count: totals.not_available_count,
                    invalid_count: s.invalid_count as i64,
                    total_tests: totals.total_tests,
                    total_rows_in_sheet: s.total_rows,
                    pass_percentage: totals.pass_percentage(),
                    fail_percentage: totals.fail_percentage(),
                    not_available_percentage: totals.not_available_percentage(),
                    configured_column_letter,
                    primary_result_column: analysis.primary_column.clone(),
                    all_result_columns: sheet.result_column_labels().join(COLUMN_SEPARATOR),
                    status: SheetStatus::Analyzed,
                }
            }
            None => Self {
                timestamp,
                sheet_name: sheet.sheet_name.clone(),
                total_rows: sheet.total_rows,
                total_columns: sheet.total_columns,
                has_results: false,
                pass_count: 0,
                fail_count: 0,
                not_available_count: 0,
                invalid_count: 0,
                total_tests: 0,
                total_rows_in_sheet: sheet.total_rows,
                pass_percentage: 0.0,
                fail_percentage: 0.0,
                not_available_percentage: 0.0,
                configured_column_letter,
                primary_result_column: String::new(),
                all_result_columns: String::new(),
                status: sheet.status(),
            },
        }
    }

    pub fn totals(&self) -> Totals {
        Totals {
            pass_count: self.pass_count,
            fail_count: self.fail_count,
            not_available_count: self.not_available_count,
            total_tests: self.total_tests,
        }
    }

    /// Recompute percentages from counts (rows written by older tools may lack them).
    pub fn with_recomputed_percentages(mut self) -> Self {
        self.pass_percentage = percentage(self.pass_count, self.total_tests);
        self.fail_percentage = percentage(self.fail_count, self.total_tests);
        self.not_available_percentage = percentage(self.not_available_count, self.total_tests);
        self
    }
}

impl WorkbookResult {
    /// Flatten this run into persisted rows, all stamped with `run_at`.
    pub fn snapshot_rows(&self) -> Vec<SnapshotRow> {
        self.sheets
            .iter()
            .map(|s| SnapshotRow::from_sheet(self.run_at, s))
            .collect()
    }
}

fn de_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parse `2026-01-15 09:30:00`, also accepting an ISO `T` separator and fractional seconds.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| format!("cannot parse timestamp '{trimmed}': {e}"))
}

fn ser_bool<S: Serializer>(b: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *b { "True" } else { "False" })
}

fn de_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(d)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("cannot parse boolean '{other}'"))),
    }
}
