use log::debug;

use crate::classify::classify_cell;
use crate::columns::{detect, resolve_configured, DetectionOptions, ResolvedColumn};
use crate::error::AnalyzerError;
use crate::grid::SheetGrid;
use crate::model::{ColumnResult, ColumnSummary, SheetAnalysis, SheetOutcome, SheetResult};

/// Analyze one loaded sheet.
///
/// `configured` holds the sheet's column letters, or `None` to auto-detect.
/// A sheet without any usable result column is a normal `NoResults` outcome.
/// A malformed column letter is reported as an `Error` outcome for this sheet only.
pub fn analyze_sheet(
    grid: &SheetGrid,
    configured: Option<&[String]>,
    options: &DetectionOptions,
) -> SheetResult {
    let configured_letters: Vec<String> = configured
        .map(|letters| letters.iter().map(|l| l.trim().to_ascii_uppercase()).collect())
        .unwrap_or_default();

    let mut result = SheetResult {
        sheet_name: grid.name.clone(),
        total_rows: grid.total_rows(),
        total_columns: grid.total_columns(),
        configured_letters,
        warnings: Vec::new(),
        outcome: SheetOutcome::NoResults,
    };

    let resolution = match configured {
        Some(letters) => match resolve_configured(grid, letters) {
            Ok(resolution) => resolution,
            Err(e) => {
                result.outcome = SheetOutcome::Error { message: e.to_string() };
                return result;
            }
        },
        None => detect(grid, options),
    };
    result.warnings = resolution.warnings;

    if resolution.columns.is_empty() {
        debug!("sheet '{}': no result columns", grid.name);
        return result;
    }

    let columns: Vec<ColumnSummary> = resolution
        .columns
        .into_iter()
        .map(|column| {
            let counts = analyze_column(grid, column.index);
            debug!(
                "sheet '{}', column {} ('{}'): pass={} fail={} n/a={} invalid={}",
                grid.name,
                column.letter,
                column.label,
                counts.pass_count,
                counts.fail_count,
                counts.not_available_count,
                counts.invalid_count
            );
            ColumnSummary { column, result: counts }
        })
        .collect();

    let combined: ColumnResult = columns.iter().map(|c| c.result).sum();
    let primary_column = primary_column_name(&columns.iter().map(|c| &c.column).collect::<Vec<_>>());

    result.outcome = SheetOutcome::Analyzed(SheetAnalysis { columns, combined, primary_column });
    result
}

/// Analyze the outcome of reading a sheet: read failures become an `Error` outcome
/// instead of propagating.
pub fn analyze_read(
    sheet_name: &str,
    read: Result<SheetGrid, AnalyzerError>,
    configured: Option<&[String]>,
    options: &DetectionOptions,
) -> SheetResult {
    match read {
        Ok(grid) => analyze_sheet(&grid, configured, options),
        Err(e) => {
            let letters = configured
                .map(|l| l.iter().map(|s| s.trim().to_ascii_uppercase()).collect())
                .unwrap_or_default();
            SheetResult::error(sheet_name, letters, e.to_string())
        }
    }
}

/// Classify every data cell in one column.
pub fn analyze_column(grid: &SheetGrid, index: usize) -> ColumnResult {
    grid.column(index).map(classify_cell).collect()
}

fn primary_column_name(columns: &[&ResolvedColumn]) -> String {
    match columns {
        [] => String::new(),
        [only] => only.label.clone(),
        [first, second] => format!("{} + {}", first.label, second.label),
        many => format!("{} columns combined", many.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use crate::model::SheetStatus;

    fn sheet(name: &str, headers: &[&str], rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::from(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn ten_row_scenario() {
        let pass: &[&str] = &["Pass"];
        let fail: &[&str] = &["Fail"];
        let mut rows = vec![pass; 6];
        rows.extend(vec![fail; 3]);
        rows.push(&[""]);
        let grid = sheet("Auth New OP", &["Result"], &rows);

        let result = analyze_sheet(&grid, Some(&["A".to_string()]), &DetectionOptions::default());
        let s = result.summary().unwrap();
        assert_eq!(s.pass_count, 6);
        assert_eq!(s.fail_count, 3);
        assert_eq!(s.not_available_count, 0);
        assert_eq!(s.invalid_count, 1);
        assert_eq!(s.total(), 9);
        assert_eq!(s.total_rows, 10);
        assert_eq!(result.total_rows, 10);
        assert_eq!(result.status(), SheetStatus::Analyzed);
    }

    #[test]
    fn two_configured_columns_are_summed() {
        let grid = sheet(
            "Conversation Flow_main menu",
            &["ID", "Web", "IVR"],
            &[&["1", "Pass", "Fail"], &["2", "Pass", "N/A"], &["3", "", "Pass"]],
        );
        let letters = ["B".to_string(), "C".to_string()];
        let result = analyze_sheet(&grid, Some(&letters), &DetectionOptions::default());
        let analysis = result.analysis().unwrap();

        assert_eq!(analysis.columns.len(), 2);
        let b = analyze_column(&grid, 1);
        let c = analyze_column(&grid, 2);
        assert_eq!(analysis.combined, b + c);
        assert_eq!(analysis.combined.pass_count, 3);
        assert_eq!(analysis.combined.fail_count, 1);
        assert_eq!(analysis.combined.not_available_count, 1);
        assert_eq!(analysis.combined.invalid_count, 1);
        assert_eq!(analysis.combined.total_rows, 6);
        assert_eq!(analysis.primary_column, "Web + IVR");
        assert_eq!(result.configured_column_letter().as_deref(), Some("B + C"));
    }

    #[test]
    fn three_columns_primary_name() {
        let grid = sheet("S", &["a", "b", "c"], &[&["Pass", "Pass", "Pass"]]);
        let letters: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let result = analyze_sheet(&grid, Some(&letters), &DetectionOptions::default());
        assert_eq!(result.analysis().unwrap().primary_column, "3 columns combined");
    }

    #[test]
    fn out_of_range_column_leaves_no_results() {
        let grid = sheet("Narrow", &["ID", "Result"], &[&["1", "Pass"]]);
        let result = analyze_sheet(&grid, Some(&["W".to_string()]), &DetectionOptions::default());
        assert!(!result.has_results());
        assert_eq!(result.status(), SheetStatus::NoResults);
        assert_eq!(result.total_rows, 1);
        assert_eq!(result.total_columns, 2);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn partial_out_of_range_keeps_valid_columns() {
        let grid = sheet("S", &["ID", "Result"], &[&["1", "Pass"]]);
        let letters = ["B".to_string(), "Z".to_string()];
        let result = analyze_sheet(&grid, Some(&letters), &DetectionOptions::default());
        let analysis = result.analysis().unwrap();
        assert_eq!(analysis.columns.len(), 1);
        assert_eq!(analysis.primary_column, "Result");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn auto_detect_without_candidates() {
        let grid = sheet("Notes", &["Topic", "Comment"], &[&["a", "b"]]);
        let result = analyze_sheet(&grid, None, &DetectionOptions::default());
        assert_eq!(result.status(), SheetStatus::NoResults);
        assert!(result.configured_letters.is_empty());
    }

    #[test]
    fn bad_letter_is_contained_as_error() {
        let grid = sheet("S", &["A"], &[&["Pass"]]);
        let result = analyze_sheet(&grid, Some(&["1".to_string()]), &DetectionOptions::default());
        assert_eq!(result.status(), SheetStatus::Error);
        assert!(result.error_message().unwrap().contains("invalid column letter"));
    }

    #[test]
    fn read_failure_becomes_error_outcome() {
        let read = Err(AnalyzerError::SheetRead {
            sheet: "CF6_Flu".into(),
            message: "corrupt xml".into(),
        });
        let result = analyze_read("CF6_Flu", read, Some(&["j".to_string()]), &DetectionOptions::default());
        assert_eq!(result.status(), SheetStatus::Error);
        assert!(result.error_message().unwrap().contains("corrupt xml"));
        assert_eq!(result.configured_letters, vec!["J".to_string()]);
    }
}
