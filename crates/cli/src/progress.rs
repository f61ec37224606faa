//! `qatrack progress` — aggregate snapshot history across runs.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use qatrack_analyzer::history::{Comparison, PassRateRow, ProgressPoint};
use qatrack_analyzer::{History, SnapshotRow, Totals};
use qatrack_config::Settings;
use qatrack_io::snapshot::{load_history, write_combined};
use qatrack_io::{json, LoadedHistory};

use crate::exit_codes::{EXIT_NO_HISTORY, EXIT_WRITE_FAILED};
use crate::report;
use crate::CliError;

pub struct ProgressArgs {
    pub dir: Option<PathBuf>,
    pub pattern: Option<String>,
    pub sheet: Option<String>,
    pub json: bool,
    pub combined: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// `--json` document for the whole history.
#[derive(Serialize)]
struct ProgressDocument<'a> {
    files: Vec<String>,
    skipped_files: Vec<String>,
    #[serde(serialize_with = "ser_range")]
    time_range: Option<(NaiveDateTime, NaiveDateTime)>,
    latest_totals: Totals,
    overall_progress: Vec<ProgressPoint>,
    /// Null with a single snapshot.
    comparison: Option<Comparison>,
    latest_snapshot: Vec<&'a SnapshotRow>,
    pass_rate_matrix: Vec<PassRateRow>,
}

fn ser_range<S: serde::Serializer>(
    range: &Option<(NaiveDateTime, NaiveDateTime)>,
    s: S,
) -> Result<S::Ok, S::Error> {
    let fmt = |t: &NaiveDateTime| t.format(qatrack_analyzer::TIMESTAMP_FORMAT).to_string();
    match range {
        Some((first, last)) => [fmt(first), fmt(last)].serialize(s),
        None => s.serialize_none(),
    }
}

fn file_names(paths: impl Iterator<Item = impl AsRef<Path>>) -> Vec<String> {
    paths.map(|p| p.as_ref().display().to_string()).collect()
}

fn progress_document(loaded: &LoadedHistory) -> ProgressDocument<'_> {
    let history = &loaded.history;
    ProgressDocument {
        files: file_names(loaded.files.iter()),
        skipped_files: file_names(loaded.skipped.iter().map(|(p, _)| p)),
        time_range: history.time_range(),
        latest_totals: history.latest_totals(),
        overall_progress: history.overall_progress(),
        comparison: history.compare_first_last(),
        latest_snapshot: history.latest_snapshot(),
        pass_rate_matrix: history.pass_rate_matrix(),
    }
}

fn write_text(path: &Path, text: &str) -> Result<(), CliError> {
    std::fs::write(path, text).map_err(|e| {
        CliError::new(EXIT_WRITE_FAILED, format!("cannot write {}: {e}", path.display()))
    })
}

fn cmd_sheet_series(history: &History, sheet: &str, json_output: bool) -> Result<(), CliError> {
    let rows = history.sheet_series(sheet);
    if rows.is_empty() {
        let known = history.sheet_names().join(", ");
        return Err(CliError::new(EXIT_NO_HISTORY, format!("sheet '{sheet}' not found in history"))
            .with_hint(format!("known sheets: {known}")));
    }
    if json_output {
        println!("{}", json::to_string_pretty(&rows)?);
    } else {
        print!("{}", report::sheet_series_table(sheet, &rows));
    }
    Ok(())
}

pub fn cmd_progress(args: ProgressArgs) -> Result<(), CliError> {
    let settings = Settings::load();
    let dir = args.dir.unwrap_or(settings.history_dir);
    let pattern = args.pattern.unwrap_or(settings.history_pattern);

    let loaded = load_history(&dir, &pattern)?;
    for (path, reason) in &loaded.skipped {
        eprintln!("skipped {}: {reason}", path.display());
    }
    let history = &loaded.history;

    if let Some(ref path) = args.combined {
        write_combined(path, history)?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref sheet) = args.sheet {
        return cmd_sheet_series(history, sheet, args.json);
    }

    let text = report::progress_report(history, loaded.files.len(), Local::now().naive_local());
    if let Some(ref path) = args.report {
        write_text(path, &text)?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{}", json::to_string_pretty(&progress_document(&loaded))?);
    } else {
        print!("{text}");
    }
    Ok(())
}
