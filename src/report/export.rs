//! JSON run export and dataset export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{analyze_missing_values, get_features_above_threshold, AssemblyReport, CombinationResult};
use crate::scenario::{BuiltDataset, ScenarioConfig};

/// Predictors missing more than this share of cells are flagged as sparse
pub const SPARSE_PREDICTOR_RATIO: f64 = 0.3;

/// Metadata about the run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub synthmine_version: String,
    pub scenario: String,
    pub seed: u64,
}

/// Missing share of one column in the assembled dataset
#[derive(Serialize)]
pub struct MissingEntry {
    pub column: String,
    pub ratio: f64,
}

#[derive(Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub outcome: String,
    pub assembly: AssemblyReport,
    /// Cells blanked per column during injection
    pub injected: Vec<(String, usize)>,
    pub missing: Vec<MissingEntry>,
    /// Predictors above [`SPARSE_PREDICTOR_RATIO`]
    pub sparse_predictors: Vec<String>,
}

/// Complete record of a scenario run
#[derive(Serialize)]
pub struct RunExport<'a> {
    pub metadata: RunMetadata,
    pub config: &'a ScenarioConfig,
    pub dataset: DatasetOverview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<&'a [CombinationResult]>,
}

/// Missing ratio per column of the assembled dataset, sorted descending
pub fn missing_ratios(built: &BuiltDataset) -> Result<Vec<(String, f64)>> {
    let df = built
        .dataset
        .to_dataframe()
        .context("Failed to convert dataset for missing value analysis")?;
    Ok(analyze_missing_values(&df))
}

/// Predictors whose missing ratio exceeds [`SPARSE_PREDICTOR_RATIO`]
pub fn sparse_predictors(built: &BuiltDataset, outcome: &str) -> Result<Vec<String>> {
    let ratios = missing_ratios(built)?;
    Ok(get_features_above_threshold(&ratios, SPARSE_PREDICTOR_RATIO, outcome))
}

/// Assemble the export record for a run
pub fn build_run_export<'a>(
    config: &'a ScenarioConfig,
    built: &BuiltDataset,
    results: Option<&'a [CombinationResult]>,
) -> Result<RunExport<'a>> {
    let ratios = missing_ratios(built)?;
    let sparse = get_features_above_threshold(&ratios, SPARSE_PREDICTOR_RATIO, &config.outcome.name);
    let missing = ratios
        .into_iter()
        .map(|(column, ratio)| MissingEntry { column, ratio })
        .collect();

    Ok(RunExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            synthmine_version: env!("CARGO_PKG_VERSION").to_string(),
            scenario: config.name.clone(),
            seed: config.seed,
        },
        config,
        dataset: DatasetOverview {
            rows: built.dataset.n_rows(),
            columns: built.dataset.n_cols(),
            outcome: config.outcome.name.clone(),
            assembly: built.assembly.clone(),
            injected: built.injected.clone(),
            missing,
            sparse_predictors: sparse,
        },
        results,
    })
}

/// Write the run record as pretty JSON
pub fn export_run(
    config: &ScenarioConfig,
    built: &BuiltDataset,
    results: Option<&[CombinationResult]>,
    output_path: &Path,
) -> Result<()> {
    let export = build_run_export(config, built, results)?;
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize run report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

    Ok(())
}

/// Save dataset to file (CSV or Parquet based on extension)
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}
