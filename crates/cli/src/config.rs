//! `qatrack config` — validate sheet configurations, inspect user settings.

use std::path::PathBuf;

use clap::Subcommand;

use qatrack_config::Settings;

use crate::analyze::load_analysis_config;
use crate::exit_codes::{EXIT_CONFIG_INVALID, EXIT_WRITE_FAILED};
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a sheet configuration TOML without analyzing anything
    #[command(after_help = "\
Expected format:
  [detection]              # optional
  density_threshold = 0.3
  sample_size = 100

  [[sheet]]
  name = \"Auth New OP\"
  columns = [\"K\"]

  [[sheet]]
  name = \"Conversation Flow_main menu\"
  columns = [\"K\", \"L\"]

Examples:
  qatrack config validate sheets.toml")]
    Validate {
        /// Sheet configuration file
        file: PathBuf,
    },

    /// Print the settings file location and effective settings
    Show,

    /// Write a default settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { file } => cmd_config_validate(file),
        ConfigCommands::Show => cmd_config_show(),
        ConfigCommands::Init { force } => cmd_config_init(force),
    }
}

fn cmd_config_validate(file: PathBuf) -> Result<(), CliError> {
    let config = load_analysis_config(&file)?;
    match config.sheets {
        Some(ref sheets) => {
            println!("ok: {} sheet(s) configured", sheets.len());
            for entry in sheets.entries() {
                println!("  {}: {}", entry.name, entry.columns.join(" + "));
            }
        }
        None => println!("ok: no sheets configured (auto-detect)"),
    }
    Ok(())
}

fn cmd_config_show() -> Result<(), CliError> {
    let path = Settings::config_path();
    let settings = Settings::load();
    let text = settings
        .to_toml()
        .map_err(|e| CliError::new(EXIT_CONFIG_INVALID, format!("cannot render settings: {e}")))?;
    println!("# {}{}", path.display(), if path.exists() { "" } else { " (not found, defaults)" });
    print!("{text}");
    Ok(())
}

fn cmd_config_init(force: bool) -> Result<(), CliError> {
    let path = Settings::config_path();
    if path.exists() && !force {
        return Err(CliError::new(EXIT_WRITE_FAILED, format!("{} already exists", path.display()))
            .with_hint("use --force to overwrite"));
    }
    Settings::default()
        .save()
        .map_err(|e| CliError::new(EXIT_WRITE_FAILED, format!("cannot write {}: {e}", path.display())))?;
    println!("wrote {}", path.display());
    Ok(())
}
