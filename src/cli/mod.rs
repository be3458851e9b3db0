pub mod check;
pub mod config;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::settings::{parse_delimiter, Settings};

/// Build a pipeline from settings, letting a `--delimiter` flag win.
pub(crate) fn pipeline_for(settings: &Settings, delimiter: Option<&str>) -> Result<Pipeline> {
    let delimiter = match delimiter {
        Some(raw) => parse_delimiter(raw)?,
        None => settings.delimiter_byte()?,
    };
    Ok(Pipeline::new()
        .with_delimiter(delimiter)
        .with_result_file(settings.result_file.clone()))
}

#[derive(Parser)]
#[command(
    name = "spendpivot",
    about = "Pivot bank transactions into per-user monthly spending by category."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join, normalize and pivot the two CSV files, then print the summary.
    Run {
        /// Bank dimension CSV (bank_id, bank_name)
        bank: PathBuf,
        /// Transactions CSV
        transactions: PathBuf,
        /// Field delimiter of both inputs (default from settings: ",")
        #[arg(long)]
        delimiter: Option<String>,
        /// Also write the summary here; a directory gets the configured result file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate both inputs and their columns without transforming.
    Check {
        /// Bank dimension CSV (bank_id, bank_name)
        bank: PathBuf,
        /// Transactions CSV
        transactions: PathBuf,
        /// Field delimiter of both inputs
        #[arg(long)]
        delimiter: Option<String>,
    },
    /// Show or change persisted settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings.
    Show,
    /// Update one or more settings.
    Set {
        /// Default input delimiter
        #[arg(long)]
        delimiter: Option<String>,
        /// File name used when --output is a directory
        #[arg(long = "result-file")]
        result_file: Option<String>,
        /// Append-only log file ("none" disables file logging)
        #[arg(long = "log-file")]
        log_file: Option<String>,
        /// Log level filter, e.g. info or debug
        #[arg(long = "log-level")]
        log_level: Option<String>,
    },
}
