//! `qatrack analyze` — classify one workbook and write the run's outputs.

use std::path::{Path, PathBuf};

use log::info;

use qatrack_analyzer::{analyze_workbook, AnalysisConfig, WorkbookResult};
use qatrack_config::Settings;
use qatrack_io::{json, snapshot, xlsx};

use crate::exit_codes::{EXIT_CONFIG_INVALID, EXIT_WRITE_FAILED};
use crate::report;
use crate::CliError;

pub struct AnalyzeArgs {
    pub workbook: PathBuf,
    pub config: Option<PathBuf>,
    pub auto: bool,
    pub threshold: Option<f64>,
    pub out_dir: Option<PathBuf>,
    pub json: bool,
    pub no_files: bool,
    pub quiet: bool,
}

/// Read and validate a sheet configuration file.
pub fn load_analysis_config(path: &Path) -> Result<AnalysisConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_CONFIG_INVALID, format!("cannot read config {}: {e}", path.display()))
    })?;
    AnalysisConfig::from_toml(&text)
        .map_err(|e| CliError::new(EXIT_CONFIG_INVALID, format!("{}: {e}", path.display())))
}

fn resolve_config(args: &AnalyzeArgs, settings: &Settings) -> Result<AnalysisConfig, CliError> {
    let mut config = if args.auto {
        AnalysisConfig::auto_detect()
    } else {
        match args.config.as_ref().or(settings.sheet_config.as_ref()) {
            Some(path) => {
                info!("using sheet configuration {}", path.display());
                load_analysis_config(path)?
            }
            None => AnalysisConfig::auto_detect(),
        }
    };
    if let Some(threshold) = args.threshold {
        config.detection.density_threshold = threshold;
    }
    config
        .validate()
        .map_err(|e| CliError::new(EXIT_CONFIG_INVALID, e.to_string()))?;
    Ok(config)
}

pub fn cmd_analyze(args: AnalyzeArgs) -> Result<(), CliError> {
    let settings = Settings::load();
    let config = resolve_config(&args, &settings)?;

    let mut workbook = xlsx::open(&args.workbook)?;
    let result = analyze_workbook(&mut workbook, &config);

    if args.json {
        println!("{}", json::to_string_pretty(&result)?);
    } else if !args.quiet {
        print!("{}", report::summary_report(&result));
    }

    if args.no_files {
        return Ok(());
    }
    let out_dir = args.out_dir.clone().unwrap_or_else(|| settings.output_dir.clone());
    for path in write_outputs(&result, &out_dir, &settings)? {
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

/// Write the enabled outputs of one run; returns the paths written.
fn write_outputs(result: &WorkbookResult, out_dir: &Path, settings: &Settings) -> Result<Vec<PathBuf>, CliError> {
    std::fs::create_dir_all(out_dir).map_err(|e| {
        CliError::new(EXIT_WRITE_FAILED, format!("cannot create {}: {e}", out_dir.display()))
    })?;

    let mut written = Vec::new();
    if settings.write_text {
        let path = out_dir.join(report::summary_file_name(result.run_at));
        std::fs::write(&path, report::summary_report(result)).map_err(|e| {
            CliError::new(EXIT_WRITE_FAILED, format!("cannot write {}: {e}", path.display()))
        })?;
        written.push(path);
    }
    if settings.write_json {
        let path = out_dir.join(json::analysis_file_name(result.run_at));
        json::write_detailed(&path, result)?;
        written.push(path);
    }
    if settings.write_csv {
        let path = out_dir.join(snapshot::snapshot_file_name(result.run_at));
        snapshot::write_snapshot(&path, &result.snapshot_rows())?;
        written.push(path);
    }
    Ok(written)
}
