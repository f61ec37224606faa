use chrono::{Local, NaiveDateTime, Timelike};
use log::{info, warn};

use crate::analyze::analyze_read;
use crate::config::AnalysisConfig;
use crate::grid::WorkbookSource;
use crate::model::{AnalysisMode, SheetResult, WorkbookResult};

/// Analyze a workbook, stamping the run with the current local time.
pub fn analyze_workbook<W: WorkbookSource>(source: &mut W, config: &AnalysisConfig) -> WorkbookResult {
    analyze_workbook_at(source, config, Local::now().naive_local())
}

/// Analyze a workbook with an explicit run timestamp (truncated to whole seconds).
///
/// With a sheet configuration, exactly the configured sheets present in the workbook
/// are analyzed, in configuration order; configured sheets missing from the workbook
/// become warnings. Without one, every sheet is auto-detected. A failing sheet never
/// stops the run.
pub fn analyze_workbook_at<W: WorkbookSource>(
    source: &mut W,
    config: &AnalysisConfig,
    run_at: NaiveDateTime,
) -> WorkbookResult {
    let run_at = run_at.with_nanosecond(0).unwrap_or(run_at);
    let sheet_names = source.sheet_names();
    let mut warnings = Vec::new();

    let (mode, targets): (AnalysisMode, Vec<(String, Option<Vec<String>>)>) = match config.sheets {
        Some(ref sheets) => {
            let missing: Vec<&str> = sheets
                .sheet_names()
                .filter(|name| !sheet_names.iter().any(|s| s.as_str() == *name))
                .collect();
            if !missing.is_empty() {
                let msg = format!(
                    "{} configured sheet(s) not found in workbook: {}",
                    missing.len(),
                    missing.join(", ")
                );
                warn!("{msg}");
                warnings.push(msg);
            }
            let targets = sheets
                .entries()
                .iter()
                .filter(|e| sheet_names.contains(&e.name))
                .map(|e| (e.name.clone(), Some(e.columns.clone())))
                .collect();
            (AnalysisMode::Configured, targets)
        }
        None => (
            AnalysisMode::AutoDetect,
            sheet_names.iter().map(|s| (s.clone(), None)).collect(),
        ),
    };

    info!(
        "analyzing {} of {} sheet(s) in {}",
        targets.len(),
        sheet_names.len(),
        source.file_name()
    );

    let configured_sheet_count = match config.sheets {
        Some(ref sheets) => sheets.len(),
        None => sheet_names.len(),
    };

    let sheets: Vec<SheetResult> = targets
        .into_iter()
        .map(|(name, letters)| {
            let read = source.read_sheet(&name);
            let result = analyze_read(&name, read, letters.as_deref(), &config.detection);
            if let Some(msg) = result.error_message() {
                warn!("sheet '{name}': {msg}");
            }
            result
        })
        .collect();

    WorkbookResult {
        file_name: source.file_name(),
        sheet_count: sheet_names.len(),
        sheet_names,
        run_at,
        mode,
        configured_sheet_count,
        sheets,
        warnings,
    }
}
