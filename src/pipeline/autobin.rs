//! Supervised binning with CART-style splits
//!
//! The predictor is sorted, and split points are searched recursively so that
//! each split maximizes the reduction in multi-class Gini impurity of the
//! outcome. The resulting boundaries become right-closed cut-points whose
//! outer bounds are open, while labels show the observed range.

use serde::{Deserialize, Serialize};

use super::discretize::{AutoBinner, CutPoints, MAX_PREDICTOR_LEVELS};
use super::error::{PipelineError, Result};
use super::table::{CategoricalData, Table};

/// Values closer than this are treated as ties and never split apart
const TIE_EPSILON: f64 = 1e-10;

fn default_max_bins() -> usize {
    4
}

fn default_min_bin_pct() -> f64 {
    5.0
}

/// Configuration for [`CartBinner`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoBinConfig {
    /// Maximum number of bins (at most 5)
    #[serde(default = "default_max_bins")]
    pub max_bins: usize,
    /// Minimum bin size as a percentage of the rows (0-100)
    #[serde(default = "default_min_bin_pct")]
    pub min_bin_pct: f64,
}

impl Default for AutoBinConfig {
    fn default() -> Self {
        Self {
            max_bins: default_max_bins(),
            min_bin_pct: default_min_bin_pct(),
        }
    }
}

/// Decision-tree binner over one numeric predictor
#[derive(Debug, Clone, Default)]
pub struct CartBinner {
    config: AutoBinConfig,
}

impl CartBinner {
    pub fn new(config: AutoBinConfig) -> Result<Self> {
        if !(2..=MAX_PREDICTOR_LEVELS).contains(&config.max_bins) {
            return Err(PipelineError::parameter(
                "auto-binner",
                format!("max_bins must be in 2..={}, got {}", MAX_PREDICTOR_LEVELS, config.max_bins),
            ));
        }
        if !(0.0..=100.0).contains(&config.min_bin_pct) {
            return Err(PipelineError::parameter(
                "auto-binner",
                format!("min_bin_pct must be between 0 and 100, got {}", config.min_bin_pct),
            ));
        }
        Ok(Self { config })
    }

    /// Cut-points chosen for a predictor/outcome pairing (sorted internally)
    pub fn fit(&self, pairs: &[(f64, usize)], n_classes: usize) -> Result<CutPoints> {
        let mut sorted = pairs.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let Some(&(min, _)) = sorted.first() else {
            return Err(PipelineError::PreconditionFailed(
                "no observed predictor values to bin".to_string(),
            ));
        };
        let max = sorted[sorted.len() - 1].0;

        let min_samples = ((self.config.min_bin_pct / 100.0) * sorted.len() as f64).ceil().max(1.0) as usize;
        let mut split_indices = Vec::new();
        find_splits_recursive(
            &sorted,
            0,
            self.config.max_bins.saturating_sub(1),
            min_samples,
            n_classes,
            &mut split_indices,
        );
        split_indices.sort_unstable();

        // a split at index i puts sorted[i - 1] as the closed upper bound;
        // sorted[i - 1] < sorted[i] keeps splits strictly increasing and below max
        let splits: Vec<f64> = split_indices.iter().map(|&i| sorted[i - 1].0).collect();

        // outer bounds stay open so a split at the minimum survives
        let mut breaks = Vec::with_capacity(splits.len() + 2);
        breaks.push(f64::NEG_INFINITY);
        breaks.extend_from_slice(&splits);
        breaks.push(f64::INFINITY);

        let lows = std::iter::once(min).chain(splits.iter().copied());
        let highs = splits.iter().copied().chain(std::iter::once(max));
        let labels: Vec<String> = lows
            .zip(highs)
            .enumerate()
            .map(|(i, (lo, hi))| format_interval(lo, hi, i == 0))
            .collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        CutPoints::new(breaks, &label_refs, true)
    }
}

impl AutoBinner for CartBinner {
    fn auto_bin(&self, table: &Table, predictor_index: usize) -> Result<CategoricalData> {
        let predictor = &table.columns()[predictor_index];
        let outcome = table.columns()[table.n_cols() - 1].as_categorical()?;
        let n_classes = outcome.levels().len();

        let pairs: Vec<(f64, usize)> = (0..table.n_rows())
            .filter_map(|row| {
                let value = predictor.data.numeric(row)?;
                let class = outcome.codes()[row]?;
                Some((value, class as usize))
            })
            .collect();

        let cuts = self.fit(&pairs, n_classes)?;
        let codes = (0..table.n_rows())
            .map(|row| {
                predictor
                    .data
                    .numeric(row)
                    .and_then(|v| cuts.assign(v))
                    .map(|i| i as u32)
            })
            .collect();
        CategoricalData::new(cuts.labels.clone(), codes)
    }
}

fn format_interval(lo: f64, hi: f64, closed_low: bool) -> String {
    if closed_low {
        format!("[{},{}]", lo, hi)
    } else {
        format!("({},{}]", lo, hi)
    }
}

/// Multi-class Gini impurity: 1 - sum of squared class proportions
fn gini_impurity(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

/// Find the split index that maximizes impurity reduction
///
/// Returns (split_index, gain) where the right side starts at split_index.
fn find_best_split(sorted_pairs: &[(f64, usize)], min_samples: usize, n_classes: usize) -> Option<(usize, f64)> {
    let n = sorted_pairs.len();
    if n < 2 * min_samples || n < 2 {
        return None;
    }

    let mut totals = vec![0.0; n_classes];
    for &(_, class) in sorted_pairs {
        totals[class] += 1.0;
    }
    let parent_gini = gini_impurity(&totals);

    let mut best_gain = 0.0;
    let mut best_split_idx = None;
    let mut left = vec![0.0; n_classes];

    for i in 0..n - 1 {
        left[sorted_pairs[i].1] += 1.0;

        let left_count = i + 1;
        let right_count = n - left_count;
        if left_count < min_samples || right_count < min_samples {
            continue;
        }

        // Skip if this value equals the next (avoid splitting within same value)
        if (sorted_pairs[i].0 - sorted_pairs[i + 1].0).abs() < TIE_EPSILON {
            continue;
        }

        let right: Vec<f64> = totals.iter().zip(&left).map(|(t, l)| t - l).collect();
        let left_prop = left_count as f64 / n as f64;
        let right_prop = right_count as f64 / n as f64;
        let weighted_child_gini = left_prop * gini_impurity(&left) + right_prop * gini_impurity(&right);

        let gain = parent_gini - weighted_child_gini;
        if gain > best_gain {
            best_gain = gain;
            best_split_idx = Some(i + 1);
        }
    }

    best_split_idx.map(|idx| (idx, best_gain))
}

/// Recursively collect split indices, sharing the remaining split budget
/// between the left and right partitions
fn find_splits_recursive(
    sorted_pairs: &[(f64, usize)],
    offset: usize,
    max_splits: usize,
    min_samples: usize,
    n_classes: usize,
    split_indices: &mut Vec<usize>,
) {
    if max_splits == 0 || sorted_pairs.len() < 2 * min_samples {
        return;
    }

    if let Some((local_split_idx, _gain)) = find_best_split(sorted_pairs, min_samples, n_classes) {
        let global_split_idx = offset + local_split_idx;
        split_indices.push(global_split_idx);

        let (left, right) = sorted_pairs.split_at(local_split_idx);

        let remaining_splits = max_splits - 1;
        let left_splits = remaining_splits / 2;
        let right_splits = remaining_splits - left_splits;

        find_splits_recursive(left, offset, left_splits, min_samples, n_classes, split_indices);
        find_splits_recursive(right, global_split_idx, right_splits, min_samples, n_classes, split_indices);
    }
}
