//! Baseline miner built on contingency tables
//!
//! Each combination of predictors is cross-classified against the outcome
//! (a missing predictor value is its own level). Strength is the
//! bias-corrected Cramér's V; significance comes from the chi-square
//! statistic; the interval is a percentile bootstrap computed only for the
//! combinations that are reported.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::stats::{bias_corrected_cramers_v, chi_square_z, normal_upper_tail, ContingencyStat};
use super::{AssociationMiner, CombinationResult, MiningRequest};
use crate::pipeline::error::{PipelineError, Result};
use crate::pipeline::outcome::quantile_sorted;
use crate::pipeline::table::{CategoricalData, Dataset};

fn default_max_size() -> usize {
    3
}

fn default_bootstrap() -> usize {
    200
}

fn default_confidence() -> f64 {
    0.95
}

/// Settings for [`ContingencyMiner`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Largest combination tried when the request leaves the size open
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Bootstrap replicates per reported combination
    #[serde(default = "default_bootstrap")]
    pub bootstrap: usize,
    /// Two-sided confidence level of the interval
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Seed for the bootstrap resampling
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub show_progress: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            bootstrap: default_bootstrap(),
            confidence: default_confidence(),
            seed: 0,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContingencyMiner {
    config: MinerConfig,
}

/// Scored combination before the interval is attached
struct Scored {
    combo: Vec<usize>,
    keys: Vec<u64>,
    estimate: f64,
    z_score: f64,
}

impl ContingencyMiner {
    pub fn new(config: MinerConfig) -> Result<Self> {
        if config.max_size == 0 {
            return Err(PipelineError::parameter("miner", "max_size must be at least 1"));
        }
        if !(config.confidence > 0.0 && config.confidence < 1.0) {
            return Err(PipelineError::parameter(
                "miner",
                format!("confidence must be in (0, 1), got {}", config.confidence),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Percentile bootstrap interval of the estimate for one combination
    fn bootstrap_interval(&self, keys: &[u64], classes: &[u32], n_classes: usize, seed: u64) -> (f64, f64) {
        if self.config.bootstrap == 0 {
            return (f64::NAN, f64::NAN);
        }
        let n = classes.len();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows = vec![0usize; n];
        let mut estimates: Vec<f64> = (0..self.config.bootstrap)
            .map(|_| {
                for slot in rows.iter_mut() {
                    *slot = rng.gen_range(0..n);
                }
                let stat = ContingencyStat::from_rows(keys, classes, n_classes, &rows);
                bias_corrected_cramers_v(&stat)
            })
            .collect();
        estimates.sort_by(|a, b| a.total_cmp(b));

        let alpha = 1.0 - self.config.confidence;
        (
            quantile_sorted(&estimates, alpha / 2.0),
            quantile_sorted(&estimates, 1.0 - alpha / 2.0),
        )
    }
}

/// Key of the joint level of `combo` for every row; a missing value is its
/// own level
///
/// Keys are renumbered densely in order of first appearance after each
/// predictor, so they stay below the row count for any combination size.
fn joint_keys(predictors: &[&CategoricalData], combo: &[usize], n_rows: usize) -> Vec<u64> {
    let mut keys = vec![0u64; n_rows];
    for &p in combo {
        let codes = predictors[p].codes();
        let mut dense: HashMap<(u64, Option<u32>), u64> = HashMap::new();
        for (key, code) in keys.iter_mut().zip(codes) {
            let next = dense.len() as u64;
            *key = *dense.entry((*key, *code)).or_insert(next);
        }
    }
    keys
}

impl AssociationMiner for ContingencyMiner {
    fn mine(&self, dataset: &Dataset, request: &MiningRequest) -> Result<Vec<CombinationResult>> {
        let predictors: Vec<&CategoricalData> = dataset
            .predictors()
            .iter()
            .map(|c| c.as_categorical())
            .collect::<Result<_>>()?;
        let outcome = dataset
            .outcome()
            .ok_or_else(|| PipelineError::PreconditionFailed("dataset has no outcome".to_string()))?
            .as_categorical()?;

        let classes: Vec<u32> = outcome
            .codes()
            .iter()
            .map(|c| c.ok_or_else(|| PipelineError::PreconditionFailed("outcome has missing values".to_string())))
            .collect::<Result<_>>()?;
        let n_classes = outcome.levels().len();
        let n_rows = dataset.n_rows();
        let all_rows: Vec<usize> = (0..n_rows).collect();

        let p = predictors.len();
        let sizes: Vec<usize> = match request.combination_size {
            Some(k) => vec![k],
            None => (1..=self.config.max_size.min(p)).collect(),
        };
        let candidates: Vec<Vec<usize>> = sizes
            .iter()
            .flat_map(|&k| (0..p).combinations(k))
            .collect();

        let pb = if self.config.show_progress {
            let pb = ProgressBar::new(candidates.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("   Scoring combinations [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) [{eta}]")
                    .map_err(|e| PipelineError::parameter("progress", e.to_string()))?
                    .progress_chars("=>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };
        let progress_counter = AtomicU64::new(0);
        let total = candidates.len() as u64;

        let mut scored: Vec<Scored> = candidates
            .into_par_iter()
            .map(|combo| {
                let keys = joint_keys(&predictors, &combo, n_rows);
                let stat = ContingencyStat::from_rows(&keys, &classes, n_classes, &all_rows);

                let count = progress_counter.fetch_add(1, Ordering::Relaxed);
                if count % 10 == 0 || count + 1 == total {
                    pb.set_position(count + 1);
                }

                Scored {
                    combo,
                    keys,
                    estimate: bias_corrected_cramers_v(&stat),
                    z_score: chi_square_z(stat.chi_square, stat.df),
                }
            })
            .collect();
        pb.finish_and_clear();

        // Size chosen by the most significant combination when left open
        if request.combination_size.is_none() {
            if let Some(best) = scored.iter().max_by(|a, b| a.z_score.total_cmp(&b.z_score)) {
                let size = best.combo.len();
                scored.retain(|s| s.combo.len() == size);
            }
        }

        scored.sort_by(|a, b| {
            b.estimate
                .total_cmp(&a.estimate)
                .then_with(|| b.z_score.total_cmp(&a.z_score))
                .then_with(|| a.combo.cmp(&b.combo))
        });
        scored.truncate(request.result_count());

        let results = scored
            .into_iter()
            .enumerate()
            .map(|(rank, s)| {
                let names = s
                    .combo
                    .iter()
                    .map(|&i| dataset.predictors()[i].name.clone())
                    .collect();
                let interval = self.bootstrap_interval(
                    &s.keys,
                    &classes,
                    n_classes,
                    self.config.seed.wrapping_add(rank as u64),
                );
                CombinationResult {
                    variables: names,
                    estimate: s.estimate,
                    confidence_interval: interval,
                    z_score: s.z_score,
                    p_value: normal_upper_tail(s.z_score),
                }
            })
            .collect();

        Ok(results)
    }
}
