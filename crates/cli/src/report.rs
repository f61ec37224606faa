//! Plain-text reports: per-run summary and cross-run progress.

use chrono::NaiveDateTime;

use qatrack_analyzer::history::Comparison;
use qatrack_analyzer::model::{AnalysisMode, SheetOutcome};
use qatrack_analyzer::{History, SnapshotRow, Totals, WorkbookResult, TIMESTAMP_FORMAT};

const WIDTH: usize = 70;

/// `qa_summary_20260115_093000.txt`
pub fn summary_file_name(run_at: NaiveDateTime) -> String {
    format!("qa_summary_{}.txt", run_at.format("%Y%m%d_%H%M%S"))
}

fn rule(ch: char) -> String {
    ch.to_string().repeat(WIDTH)
}

fn ts(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// One-decimal share, or a bare count when there are no valid tests.
fn count_line(label: &str, count: i64, total: i64) -> String {
    if total > 0 {
        format!("{label}: {count} ({:.1}%)", count as f64 / total as f64 * 100.0)
    } else {
        format!("{label}: {count}")
    }
}

fn totals_lines(lines: &mut Vec<String>, t: &Totals) {
    lines.push(format!("Total Test Cases: {}", t.total_tests));
    lines.push(count_line("  ✓ Passed", t.pass_count, t.total_tests));
    lines.push(count_line("  ✗ Failed", t.fail_count, t.total_tests));
    lines.push(count_line("  ⊘ Not Available", t.not_available_count, t.total_tests));
}

// ---------------------------------------------------------------------------
// Summary report
// ---------------------------------------------------------------------------

pub fn summary_report(result: &WorkbookResult) -> String {
    let mut lines = Vec::new();
    lines.push(rule('='));
    lines.push("QA TESTING SUMMARY REPORT".to_string());
    lines.push(rule('='));
    lines.push(format!("Generated: {}", ts(result.run_at)));
    lines.push(format!("File: {}", result.file_name));
    lines.push(format!("Total Sheets in Workbook: {}", result.sheet_count));
    match result.mode {
        AnalysisMode::Configured => {
            lines.push("Configuration: Configured sheets and columns".to_string());
            lines.push(format!("Configured Sheets: {}", result.configured_sheet_count));
        }
        AnalysisMode::AutoDetect => {
            lines.push("Configuration: Auto-detection mode (all sheets)".to_string());
        }
    }
    for warning in &result.warnings {
        lines.push(format!("⚠ {warning}"));
    }
    lines.push(String::new());

    lines.push("OVERALL SUMMARY".to_string());
    lines.push(rule('-'));
    lines.push(format!(
        "Sheets with QA Results: {}/{}",
        result.sheets_with_results().count(),
        result.sheet_count
    ));
    totals_lines(&mut lines, &result.totals());
    lines.push(String::new());

    lines.push("SHEET-BY-SHEET BREAKDOWN".to_string());
    lines.push(rule('-'));
    for sheet in &result.sheets {
        lines.push(String::new());
        lines.push(format!("📄 {}", sheet.sheet_name));
        lines.push(format!("   Total Rows: {}", sheet.total_rows));

        match &sheet.outcome {
            SheetOutcome::Analyzed(analysis) => {
                if let Some(letters) = sheet.configured_column_letter() {
                    lines.push(format!("   Configured Column(s): {letters}"));
                }
                if analysis.columns.len() > 1 {
                    lines.push(format!(
                        "   Analyzing Multiple Columns: {}",
                        sheet.result_column_labels().join(", ")
                    ));
                } else {
                    lines.push(format!("   Result Column: {}", analysis.primary_column));
                }

                let s = &analysis.combined;
                lines.push(format!("   Valid Tests: {} (of {} rows)", s.total(), s.total_rows));
                lines.push(format!("   ✓ Pass: {}", s.pass_count));
                lines.push(format!("   ✗ Fail: {}", s.fail_count));
                lines.push(format!("   ⊘ Not Available: {}", s.not_available_count));
                if s.invalid_count > 0 {
                    lines.push(format!("   ⚠ Invalid/Empty: {} (excluded)", s.invalid_count));
                }

                if analysis.columns.len() > 1 {
                    lines.push("   Column Breakdown:".to_string());
                    for c in &analysis.columns {
                        lines.push(format!(
                            "      • {} ({}): Pass={}, Fail={}, N/A={}",
                            c.column.label,
                            c.column.letter,
                            c.result.pass_count,
                            c.result.fail_count,
                            c.result.not_available_count
                        ));
                    }
                }
            }
            SheetOutcome::NoResults => {
                if let Some(letters) = sheet.configured_column_letter() {
                    lines.push(format!("   Configured Column(s): {letters}"));
                }
                lines.push("   ⚠ No QA result columns detected".to_string());
            }
            SheetOutcome::Error { message } => {
                lines.push(format!("   ⚠ Error: {message}"));
            }
        }
        for warning in &sheet.warnings {
            lines.push(format!("   ⚠ {warning}"));
        }
    }

    lines.push(String::new());
    lines.push(rule('='));
    lines.push("END OF REPORT".to_string());
    lines.push(rule('='));
    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Progress report
// ---------------------------------------------------------------------------

fn comparison_lines(lines: &mut Vec<String>, cmp: &Comparison) {
    lines.push(format!("From: {}", ts(cmp.first_timestamp)));
    lines.push(format!("To:   {}", ts(cmp.last_timestamp)));
    lines.push(String::new());
    lines.push("Changes:".to_string());
    lines.push(format!("  Total Tests: {:+}", cmp.changes.total_change));
    lines.push(format!("  Passed: {:+}", cmp.changes.pass_change));
    lines.push(format!("  Failed: {:+}", cmp.changes.fail_change));
    lines.push(format!("  Not Available: {:+}", cmp.changes.not_available_change));
}

pub fn progress_report(history: &History, file_count: usize, generated: NaiveDateTime) -> String {
    let mut lines = Vec::new();
    lines.push(rule('='));
    lines.push("QA TESTING PROGRESS REPORT".to_string());
    lines.push(rule('='));
    lines.push(format!("Report Generated: {}", ts(generated)));
    lines.push(format!("CSV Files Analyzed: {file_count}"));
    lines.push(String::new());

    let Some((first, last)) = history.time_range() else {
        lines.push("No snapshot data loaded".to_string());
        return lines.join("\n") + "\n";
    };
    lines.push(format!("Time Period: {} to {}", ts(first), ts(last)));
    lines.push(String::new());

    lines.push("CURRENT STATUS (Latest Run)".to_string());
    lines.push(rule('-'));
    lines.push(format!("As of: {}", ts(last)));
    totals_lines(&mut lines, &history.latest_totals());
    lines.push(String::new());

    lines.push("PROGRESS OVER TIME".to_string());
    lines.push(rule('-'));
    match history.compare_first_last() {
        Some(cmp) => comparison_lines(&mut lines, &cmp),
        None => lines.push("Insufficient data: only one snapshot loaded".to_string()),
    }
    lines.push(String::new());

    let progress = history.overall_progress();
    if progress.len() > 1 {
        lines.push("TREND ANALYSIS".to_string());
        lines.push(rule('-'));
        lines.push(String::new());
        lines.push("Date                | Total | Pass | Fail |  N/A  | Pass%".to_string());
        lines.push(rule('-'));
        for p in &progress {
            lines.push(format!(
                "{} | {:5} | {:4} | {:4} | {:5} | {:5.1}%",
                ts(p.timestamp),
                p.totals.total_tests,
                p.totals.pass_count,
                p.totals.fail_count,
                p.totals.not_available_count,
                p.pass_percentage
            ));
        }
        lines.push(String::new());
    }

    lines.push("SHEET-BY-SHEET CURRENT STATUS".to_string());
    lines.push(rule('-'));
    for row in history.latest_snapshot() {
        lines.push(String::new());
        lines.push(format!("📄 {}", row.sheet_name));
        if row.has_results {
            lines.push(format!("   Total Tests: {}", row.total_tests));
            lines.push(format!("   ✓ Pass: {} ({:.1}%)", row.pass_count, row.pass_percentage));
            lines.push(format!("   ✗ Fail: {} ({:.1}%)", row.fail_count, row.fail_percentage));
            lines.push(format!(
                "   ⊘ Not Available: {} ({:.1}%)",
                row.not_available_count, row.not_available_percentage
            ));
        } else {
            lines.push(format!("   Status: {}", row.status));
        }
    }

    lines.push(String::new());
    lines.push(rule('='));
    lines.push("END OF PROGRESS REPORT".to_string());
    lines.push(rule('='));
    lines.join("\n") + "\n"
}

/// One sheet's history as a table.
pub fn sheet_series_table(sheet_name: &str, rows: &[&SnapshotRow]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("📄 {sheet_name}"));
    lines.push(rule('-'));
    lines.push("Date                | Total | Pass | Fail |  N/A  | Pass%  | Status".to_string());
    for row in rows {
        lines.push(format!(
            "{} | {:5} | {:4} | {:4} | {:5} | {:5.1}% | {}",
            ts(row.timestamp),
            row.total_tests,
            row.pass_count,
            row.fail_count,
            row.not_available_count,
            row.pass_percentage,
            row.status
        ));
    }
    lines.join("\n") + "\n"
}
