//! Missing value injection and analysis

use polars::prelude::DataFrame;
use rand::seq::{index, SliceRandom};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, Result};
use super::table::{Column, Table};

/// How many cells of a column to blank out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAmount {
    /// Fraction p in (0, 1); round(p * n) cells
    Fraction(f64),
    /// Exact number of cells
    Count(usize),
}

impl MissingAmount {
    /// Number of cells this amount selects in a column of `n` rows
    pub fn cells(&self, column: &str, n: usize) -> Result<usize> {
        let k = match *self {
            MissingAmount::Fraction(p) => {
                if !(p > 0.0 && p < 1.0) {
                    return Err(PipelineError::parameter(
                        column,
                        format!("missing fraction must be in (0, 1), got {}", p),
                    ));
                }
                (p * n as f64).round() as usize
            }
            MissingAmount::Count(k) => k,
        };
        if k > n {
            return Err(PipelineError::TooManyMissing {
                column: column.to_string(),
                requested: k,
                available: n,
            });
        }
        Ok(k)
    }
}

/// Whether columns draw their missing rows independently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingnessPolicy {
    /// Each column draws its own row set
    #[default]
    Independent,
    /// One shuffle of the row indices, consecutive chunks per column; no row
    /// is missing in two columns
    Disjoint,
}

/// Whether injection happens before or after the outcome is synthesized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingnessStage {
    /// Missing predictors propagate into the outcome
    BeforeOutcome,
    /// Outcome stays fully observed
    #[default]
    AfterOutcome,
}

/// Scenario-level missingness settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingnessConfig {
    #[serde(default)]
    pub stage: MissingnessStage,
    pub amount: MissingAmount,
    #[serde(default)]
    pub policy: MissingnessPolicy,
    /// Columns to touch; empty means every predictor
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// Allow the outcome column to be blanked as well
    #[serde(default)]
    pub include_outcome: bool,
    /// Reseed a fresh generator with this value right before injection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reseed: Option<u64>,
}

/// Blank out cells of one column; returns the chosen rows in draw order
pub fn inject_missing<R: Rng + ?Sized>(column: &mut Column, amount: MissingAmount, rng: &mut R) -> Result<Vec<usize>> {
    let n = column.len();
    let k = amount.cells(&column.name, n)?;
    let rows = index::sample(rng, n, k).into_vec();
    for &row in &rows {
        column.data.set_missing(row);
    }
    Ok(rows)
}

/// Apply a missingness config to a table.
///
/// The outcome column (if any) is skipped unless `include_outcome` is set.
/// When `reseed` is set, a fresh generator seeded with that value is used in
/// place of `rng`, leaving `rng` untouched.
pub fn inject_table<R: Rng + ?Sized>(
    table: &mut Table,
    config: &MissingnessConfig,
    outcome: Option<&str>,
    rng: &mut R,
) -> Result<Vec<(String, Vec<usize>)>> {
    let targets: Vec<String> = if config.columns.is_empty() {
        table
            .names()
            .into_iter()
            .filter(|name| config.include_outcome || Some(*name) != outcome)
            .map(str::to_string)
            .collect()
    } else {
        for name in &config.columns {
            table.get(name)?;
            if !config.include_outcome && Some(name.as_str()) == outcome {
                return Err(PipelineError::parameter(
                    name,
                    "outcome column is protected unless include_outcome is set",
                ));
            }
        }
        config.columns.clone()
    };

    match config.reseed {
        Some(seed) => {
            let mut fresh = StdRng::seed_from_u64(seed);
            inject_columns(table, &targets, config, &mut fresh)
        }
        None => inject_columns(table, &targets, config, rng),
    }
}

fn inject_columns<R: Rng + ?Sized>(
    table: &mut Table,
    targets: &[String],
    config: &MissingnessConfig,
    rng: &mut R,
) -> Result<Vec<(String, Vec<usize>)>> {
    let n = table.n_rows();
    let mut chosen = Vec::with_capacity(targets.len());

    match config.policy {
        MissingnessPolicy::Independent => {
            for name in targets {
                let column = table.get_mut(name)?;
                let rows = inject_missing(column, config.amount, rng)?;
                chosen.push((name.clone(), rows));
            }
        }
        MissingnessPolicy::Disjoint => {
            let sizes = targets
                .iter()
                .map(|name| config.amount.cells(name, n))
                .collect::<Result<Vec<_>>>()?;
            let total: usize = sizes.iter().sum();
            if total > n {
                return Err(PipelineError::TooManyMissing {
                    column: targets.join(","),
                    requested: total,
                    available: n,
                });
            }

            let mut order: Vec<usize> = (0..n).collect();
            order.shuffle(rng);

            let mut offset = 0;
            for (name, k) in targets.iter().zip(sizes) {
                let rows = order[offset..offset + k].to_vec();
                offset += k;
                let column = table.get_mut(name)?;
                for &row in &rows {
                    column.data.set_missing(row);
                }
                chosen.push((name.clone(), rows));
            }
        }
    }

    Ok(chosen)
}

/// Missing ratio per column of a DataFrame, sorted descending
pub fn analyze_missing_values(df: &DataFrame) -> Vec<(String, f64)> {
    // Handle empty DataFrame
    if df.height() == 0 {
        return Vec::new();
    }

    let rows = df.height() as f64;
    let mut missing_ratios: Vec<(String, f64)> = df
        .get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count() as f64 / rows))
        .collect();

    // Sort by missing ratio descending
    missing_ratios.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    missing_ratios
}

/// Columns whose missing ratio exceeds the threshold (outcome excluded)
pub fn get_features_above_threshold(
    missing_ratios: &[(String, f64)],
    threshold: f64,
    outcome_column: &str,
) -> Vec<String> {
    missing_ratios
        .iter()
        .filter(|(name, ratio)| *ratio > threshold && name != outcome_column)
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_rounds() {
        assert_eq!(MissingAmount::Fraction(0.1).cells("x", 1000).unwrap(), 100);
        assert_eq!(MissingAmount::Fraction(0.15).cells("x", 10).unwrap(), 2);
        assert_eq!(MissingAmount::Fraction(0.04).cells("x", 10).unwrap(), 0);
    }

    #[test]
    fn test_amount_validation() {
        assert!(MissingAmount::Fraction(0.0).cells("x", 10).is_err());
        assert!(MissingAmount::Fraction(1.0).cells("x", 10).is_err());
        assert!(matches!(
            MissingAmount::Count(11).cells("x", 10),
            Err(PipelineError::TooManyMissing { .. })
        ));
    }
}
