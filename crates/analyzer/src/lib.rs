//! `qatrack-analyzer` — QA result classification and aggregation engine.
//!
//! Pure engine crate: receives pre-loaded sheet grids, returns classified counts
//! and cross-run trends. No CLI or file IO dependencies.

pub mod analyze;
pub mod classify;
pub mod columns;
pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod model;
pub mod snapshot;
pub mod workbook;

pub use classify::{classify, classify_cell, Classification};
pub use columns::{column_index_to_letter, column_letter_to_index, DetectionOptions};
pub use config::{AnalysisConfig, SheetConfig};
pub use error::AnalyzerError;
pub use grid::{CellValue, MemoryWorkbook, SheetGrid, WorkbookSource};
pub use history::{Changes, Comparison, History, PassRateRow, ProgressPoint};
pub use model::{percentage, ColumnResult, SheetResult, SheetStatus, Totals, WorkbookResult};
pub use snapshot::SnapshotRow;
pub use workbook::{analyze_workbook, analyze_workbook_at};

/// Timestamp format shared by snapshot rows, JSON exports and reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
