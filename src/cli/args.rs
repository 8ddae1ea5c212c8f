//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::scenario::ScenarioOverrides;

/// synthmine - Synthesize mixed-type datasets with missingness and mine them for
/// predictor combinations that explain a categorical outcome
#[derive(Parser, Debug)]
#[command(name = "synthmine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in scenarios
    List,

    /// Print a built-in scenario as JSON (a starting point for --config)
    Show {
        /// Scenario name (see `synthmine list`)
        name: String,
    },

    /// Generate a scenario's dataset and rank predictor combinations
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Built-in scenario name. Ignored when --config is given.
    #[arg(required_unless_present = "config")]
    pub name: Option<String>,

    /// Scenario file (JSON, same layout as `synthmine show`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for data generation (overrides the scenario's)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of rows to generate
    #[arg(long, value_parser = validate_rows)]
    pub rows: Option<usize>,

    /// Fixed combination size; by default the miner picks one
    #[arg(short = 'k', long, value_parser = validate_positive)]
    pub combination_size: Option<usize>,

    /// Number of ranked combinations to report
    #[arg(short = 'n', long, value_parser = validate_positive)]
    pub results: Option<usize>,

    /// Reseed a fresh generator with this value right before missing values
    /// are injected. Changes only the missingness pattern.
    #[arg(long)]
    pub reseed_missing: Option<u64>,

    /// Write the assembled dataset (CSV or Parquet, determined by extension)
    #[arg(short, long, value_parser = validate_dataset_path)]
    pub output: Option<PathBuf>,

    /// Write a JSON report of the run (config, dataset overview, results)
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Stop after assembling the dataset
    #[arg(long, default_value = "false")]
    pub no_mine: bool,

    /// Hide the combination-scoring progress bar
    #[arg(long, default_value = "false")]
    pub quiet: bool,
}

impl RunArgs {
    /// Overrides for the scenario config taken from the flags
    pub fn overrides(&self) -> ScenarioOverrides {
        ScenarioOverrides {
            seed: self.seed,
            rows: self.rows,
            combination_size: self.combination_size,
            results: self.results,
            reseed_missing: self.reseed_missing,
            show_progress: !self.quiet,
        }
    }
}

/// Validator for row counts
fn validate_rows(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{}' is not a valid row count", s))?;

    if value == 0 {
        Err("rows must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for counts that must be positive
fn validate_positive(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;

    if value == 0 {
        Err("value must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for dataset output paths
fn validate_dataset_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "parquet" => Ok(path),
        _ => Err(format!(
            "unsupported output format '{}'. Supported formats: csv, parquet",
            extension
        )),
    }
}
