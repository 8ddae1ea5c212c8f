//! Ordinal encoding and outcome synthesis
//!
//! The outcome is built in two explicit steps: informative categorical columns
//! are first encoded into derived numeric vectors with a caller-chosen level
//! order, then a weighted latent score plus noise is cut into ordered
//! categories.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, Result};
use super::generator::{sample_noise, NoiseSpec};
use super::table::{CategoricalData, Column, ColumnData, ColumnKind, Table};

/// Upper bound on generated outcome categories
pub const MAX_OUTCOME_LEVELS: usize = 10;

/// One informative predictor feeding the latent score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTerm {
    pub column: String,
    pub weight: f64,
    /// Level order for categorical columns: position i encodes as i + 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
}

impl OutcomeTerm {
    pub fn numeric(column: impl Into<String>, weight: f64) -> Self {
        Self {
            column: column.into(),
            weight,
            order: None,
        }
    }

    pub fn ordinal(column: impl Into<String>, weight: f64, order: &[&str]) -> Self {
        Self {
            column: column.into(),
            weight,
            order: Some(order.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// How the latent score is cut into ordered categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OutcomeBinning {
    /// k equal-width intervals over the observed score range
    EqualWidth { k: usize },
    /// k rank-based tiles with counts differing by at most one
    EqualFrequency { k: usize },
    /// Sample-quantile breakpoints over the non-missing scores
    Quantile { k: usize },
    /// Fixed global breakpoints
    Breaks { breaks: Vec<f64> },
}

/// Full recipe for the outcome column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub name: String,
    pub terms: Vec<OutcomeTerm>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub noise: NoiseSpec,
    pub binning: OutcomeBinning,
}

/// Encode a categorical column as 1-based ordinal positions in `order`.
///
/// Returns a new vector; the categorical column itself is untouched.
pub fn encode_ordinal(column: &Column, order: &[String]) -> Result<Vec<Option<f64>>> {
    let data = column.as_categorical()?;
    let invalid = |reason: String| PipelineError::InvalidEncoding {
        column: column.name.clone(),
        reason,
    };

    for (i, label) in order.iter().enumerate() {
        if order[..i].contains(label) {
            return Err(invalid(format!("level '{}' listed twice", label)));
        }
    }

    let positions: Vec<f64> = data
        .levels()
        .iter()
        .map(|level| {
            order
                .iter()
                .position(|o| o == level)
                .map(|p| (p + 1) as f64)
                .ok_or_else(|| invalid(format!("level '{}' missing from order", level)))
        })
        .collect::<Result<_>>()?;

    Ok(data
        .codes()
        .iter()
        .map(|c| c.map(|c| positions[c as usize]))
        .collect())
}

/// Validate every term against the table and return its numeric vector
fn term_values(table: &Table, term: &OutcomeTerm) -> Result<Vec<Option<f64>>> {
    let column = table.get(&term.column)?;
    match (&column.data, &term.order) {
        (ColumnData::Categorical(_), Some(order)) => encode_ordinal(column, order),
        (ColumnData::Categorical(_), None) => Err(PipelineError::InvalidEncoding {
            column: term.column.clone(),
            reason: "categorical term needs a level order".to_string(),
        }),
        (data, None) => Ok((0..data.len()).map(|i| data.numeric(i)).collect()),
        (data, Some(_)) => Err(PipelineError::KindMismatch {
            column: term.column.clone(),
            expected: ColumnKind::Categorical,
            actual: data.kind(),
        }),
    }
}

/// Weighted sum of the informative columns plus one noise draw per row.
///
/// Noise is drawn for every row so that missing rows do not shift the
/// random stream; a row with any missing informative value scores missing.
pub fn latent_score<R: Rng + ?Sized>(
    table: &Table,
    spec: &OutcomeSpec,
    rng: &mut R,
) -> Result<Vec<Option<f64>>> {
    if spec.terms.is_empty() {
        return Err(PipelineError::parameter(&spec.name, "no informative terms"));
    }
    if !spec.intercept.is_finite() || spec.terms.iter().any(|t| !t.weight.is_finite()) {
        return Err(PipelineError::parameter(&spec.name, "weights must be finite"));
    }

    let encoded = spec
        .terms
        .iter()
        .map(|t| term_values(table, t).map(|v| (t.weight, v)))
        .collect::<Result<Vec<_>>>()?;

    let n = table.n_rows();
    let noise = sample_noise(&spec.noise, n, rng)?;

    Ok((0..n)
        .map(|row| {
            encoded
                .iter()
                .try_fold(spec.intercept, |acc, (w, values)| values[row].map(|v| acc + w * v))
                .map(|score| score + noise[row])
        })
        .collect())
}

/// Sample quantile with linear interpolation (type 7) on sorted data
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Cut scores into ordered categories labelled "1".."k"
pub fn bin_scores(name: &str, scores: &[Option<f64>], binning: &OutcomeBinning) -> Result<CategoricalData> {
    let mut observed: Vec<f64> = scores.iter().flatten().copied().collect();
    if observed.is_empty() {
        return Err(PipelineError::PreconditionFailed(format!(
            "outcome '{}' has no observed scores",
            name
        )));
    }
    observed.sort_by(|a, b| a.total_cmp(b));
    let (min, max) = (observed[0], observed[observed.len() - 1]);

    let check_k = |k: usize| {
        if (2..=MAX_OUTCOME_LEVELS).contains(&k) {
            Ok(k)
        } else {
            Err(PipelineError::parameter(
                name,
                format!("outcome needs 2..={} categories, got {}", MAX_OUTCOME_LEVELS, k),
            ))
        }
    };

    match binning {
        OutcomeBinning::EqualFrequency { k } => {
            let k = check_k(*k)?;
            equal_frequency(scores, k)
        }
        OutcomeBinning::EqualWidth { k } => {
            let k = check_k(*k)?;
            let width = (max - min) / k as f64;
            let codes = scores
                .iter()
                .map(|s| {
                    s.map(|v| {
                        if width <= 0.0 {
                            0
                        } else {
                            (((v - min) / width).floor() as usize).min(k - 1) as u32
                        }
                    })
                })
                .collect();
            labelled(k, codes)
        }
        OutcomeBinning::Quantile { k } => {
            let k = check_k(*k)?;
            let mut breaks: Vec<f64> = (0..=k)
                .map(|i| quantile_sorted(&observed, i as f64 / k as f64))
                .collect();
            // tied quantiles collapse into fewer categories
            breaks.dedup();
            let codes = cut_right_closed(scores, &breaks);
            labelled(breaks.len().saturating_sub(1).max(1), codes)
        }
        OutcomeBinning::Breaks { breaks } => {
            if breaks.len() < 3 || breaks.len() > MAX_OUTCOME_LEVELS + 1 {
                return Err(PipelineError::InvalidBreaks(format!(
                    "outcome needs 3..={} breakpoints, got {}",
                    MAX_OUTCOME_LEVELS + 1,
                    breaks.len()
                )));
            }
            if breaks.iter().any(|b| !b.is_finite()) || breaks.windows(2).any(|w| w[0] >= w[1]) {
                return Err(PipelineError::InvalidBreaks(
                    "outcome breakpoints must be finite and strictly increasing".to_string(),
                ));
            }
            let codes = cut_right_closed(scores, breaks);
            labelled(breaks.len() - 1, codes)
        }
    }
}

/// Rank-based tiles: stable sort, rank r of m observed gets tile r*k/m
fn equal_frequency(scores: &[Option<f64>], k: usize) -> Result<CategoricalData> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|v| (i, v)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let m = ranked.len();
    let mut codes = vec![None; scores.len()];
    for (rank, (row, _)) in ranked.into_iter().enumerate() {
        codes[row] = Some((rank * k / m) as u32);
    }
    labelled(k, codes)
}

/// Right-closed intervals over `breaks`, the first one including its minimum
fn cut_right_closed(scores: &[Option<f64>], breaks: &[f64]) -> Vec<Option<u32>> {
    let first = breaks[0];
    let last = breaks[breaks.len() - 1];
    scores
        .iter()
        .map(|s| {
            let v = (*s)?;
            if v < first || v > last {
                return None;
            }
            if breaks.len() == 1 {
                return Some(0);
            }
            // index of the first break >= v, minus one; the minimum goes to 0
            let upper = breaks.partition_point(|&b| b < v);
            Some(upper.saturating_sub(1) as u32)
        })
        .collect()
}

fn labelled(k: usize, codes: Vec<Option<u32>>) -> Result<CategoricalData> {
    let levels = (1..=k).map(|i| i.to_string()).collect();
    CategoricalData::new(levels, codes)
}

/// Score and bin the outcome; missing wherever the score is missing
pub fn synthesize_outcome<R: Rng + ?Sized>(table: &Table, spec: &OutcomeSpec, rng: &mut R) -> Result<Column> {
    let scores = latent_score(table, spec, rng)?;
    let data = bin_scores(&spec.name, &scores, &spec.binning)?;
    Ok(Column::categorical(&spec.name, data))
}
