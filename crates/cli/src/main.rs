// qatrack CLI - QA workbook analysis and progress tracking

mod analyze;
mod classify;
mod config;
mod exit_codes;
mod progress;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use exit_codes::{io_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "qatrack")]
#[command(about = "Summarize pass/fail results in QA workbooks and track progress across runs")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a QA workbook and write summary, JSON and snapshot files
    #[command(after_help = "\
Writes into the output directory (default from settings, else .):
  qa_summary_<ts>.txt     human-readable summary report
  qa_analysis_<ts>.json   detailed per-sheet, per-column analysis
  qa_results_<ts>.csv     snapshot row per sheet (input to `qatrack progress`)

Examples:
  qatrack analyze 'Testing master.xlsx' --config sheets.toml
  qatrack analyze 'Testing master.xlsx' --auto --threshold 0.5
  qatrack analyze book.xlsx --json --no-files")]
    Analyze {
        /// Workbook to analyze (.xlsx, .xlsm, .xls, .xlsb, .ods)
        workbook: PathBuf,

        /// Sheet configuration TOML (default from settings)
        #[arg(long, short = 'c', conflicts_with = "auto")]
        config: Option<PathBuf>,

        /// Ignore any sheet configuration and auto-detect result columns in every sheet
        #[arg(long)]
        auto: bool,

        /// Auto-detect density threshold, 0.0-1.0 (default 0.3)
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f64>,

        /// Output directory for report files
        #[arg(long, short = 'o')]
        out_dir: Option<PathBuf>,

        /// Print the detailed analysis as JSON instead of the summary report
        #[arg(long)]
        json: bool,

        /// Do not write any files
        #[arg(long)]
        no_files: bool,

        /// Quiet mode
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Report progress across snapshot files written by `analyze`
    #[command(after_help = "\
Examples:
  qatrack progress
  qatrack progress --dir reports --pattern 'qa_results_*.csv'
  qatrack progress --sheet 'Auth New OP'
  qatrack progress --json
  qatrack progress --combined all_runs.csv --report progress.txt")]
    Progress {
        /// Directory holding snapshot files (default from settings, else .)
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,

        /// Snapshot file glob (default qa_results_*.csv)
        #[arg(long, short = 'p')]
        pattern: Option<String>,

        /// Show one sheet's history instead of the overall report
        #[arg(long)]
        sheet: Option<String>,

        /// Print aggregates as JSON
        #[arg(long)]
        json: bool,

        /// Also write every loaded row into one CSV
        #[arg(long, value_name = "FILE")]
        combined: Option<PathBuf>,

        /// Also write the text progress report to a file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Show how cell values are classified
    #[command(after_help = "\
Examples:
  qatrack classify Pass 'not working' N/A ✓
  qatrack classify --json 'in progress'")]
    Classify {
        /// Values to classify
        #[arg(required = true)]
        values: Vec<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Sheet configuration and user settings
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 1, got {value}"))
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    builder.parse_default_env();
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: qatrack <command> [options]");
            eprintln!("       qatrack --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Analyze { workbook, config, auto, threshold, out_dir, json, no_files, quiet }) => {
            analyze::cmd_analyze(analyze::AnalyzeArgs {
                workbook,
                config,
                auto,
                threshold,
                out_dir,
                json,
                no_files,
                quiet,
            })
        }
        Some(Commands::Progress { dir, pattern, sheet, json, combined, report }) => {
            progress::cmd_progress(progress::ProgressArgs { dir, pattern, sheet, json, combined, report })
        }
        Some(Commands::Classify { values, json }) => classify::cmd_classify(values, json),
        Some(Commands::Config(cmd)) => config::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<qatrack_io::IoError> for CliError {
    fn from(err: qatrack_io::IoError) -> Self {
        let code = io_exit_code(&err);
        let hint = match &err {
            qatrack_io::IoError::Open { .. } => {
                Some("supported formats: .xlsx, .xlsm, .xls, .xlsb, .ods".to_string())
            }
            qatrack_io::IoError::NoHistory { .. } => {
                Some("run `qatrack analyze` first, or point --dir/--pattern at existing snapshots".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
