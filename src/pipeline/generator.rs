//! Variable generation from parametrized distributions
//!
//! Every sampler takes the caller's generator explicitly, so two pipelines
//! seeded with the same value produce identical columns.

use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Binomial, Distribution as _, LogNormal, Normal, Poisson};
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, Result};
use super::table::{CategoricalData, Column};

/// Tolerance used when checking probability entries
const PROB_EPSILON: f64 = 1e-12;

/// Distribution family and parameters for one predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Distribution {
    /// Draw labels with replacement using relative weights (one per label)
    Categorical { labels: Vec<String>, probs: Vec<f64> },
    Normal { mean: f64, sd: f64 },
    LogNormal { meanlog: f64, sdlog: f64 },
    Poisson { lambda: f64 },
    Binomial { trials: u64, p: f64 },
    Uniform { min: f64, max: f64 },
}

/// A predictor to generate: distribution plus clamp range and rounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub distribution: Distribution,
    /// Plausible range; values are clamped into it before rounding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp: Option<(f64, f64)>,
    /// Decimal places kept after clamping (continuous only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digits: Option<u32>,
}

impl VariableSpec {
    pub fn new(name: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            distribution,
            clamp: None,
            digits: None,
        }
    }

    pub fn categorical(name: impl Into<String>, labels: &[&str], probs: &[f64]) -> Self {
        Self::new(
            name,
            Distribution::Categorical {
                labels: labels.iter().map(|s| s.to_string()).collect(),
                probs: probs.to_vec(),
            },
        )
    }

    pub fn normal(name: impl Into<String>, mean: f64, sd: f64) -> Self {
        Self::new(name, Distribution::Normal { mean, sd })
    }

    pub fn log_normal(name: impl Into<String>, meanlog: f64, sdlog: f64) -> Self {
        Self::new(name, Distribution::LogNormal { meanlog, sdlog })
    }

    pub fn poisson(name: impl Into<String>, lambda: f64) -> Self {
        Self::new(name, Distribution::Poisson { lambda })
    }

    pub fn binomial(name: impl Into<String>, trials: u64, p: f64) -> Self {
        Self::new(name, Distribution::Binomial { trials, p })
    }

    pub fn uniform(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(name, Distribution::Uniform { min, max })
    }

    pub fn with_clamp(mut self, lo: f64, hi: f64) -> Self {
        self.clamp = Some((lo, hi));
        self
    }

    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = Some(digits);
        self
    }
}

/// Mean and standard deviation of a normal noise term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    pub mean: f64,
    pub sd: f64,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self { mean: 0.0, sd: 1.0 }
    }
}

/// Validate a probability vector against its label set and normalise it.
///
/// Weights are relative: any positive total is accepted and rescaled to 1.
pub fn validate_probabilities(column: &str, labels: &[String], probs: &[f64]) -> Result<Vec<f64>> {
    let invalid = |reason: String| PipelineError::InvalidProbabilities {
        column: column.to_string(),
        reason,
    };

    if labels.is_empty() {
        return Err(invalid("label set is empty".to_string()));
    }
    if probs.len() != labels.len() {
        return Err(invalid(format!(
            "{} probabilities for {} labels",
            probs.len(),
            labels.len()
        )));
    }
    for (i, label) in labels.iter().enumerate() {
        if labels[..i].contains(label) {
            return Err(invalid(format!("duplicate label '{}'", label)));
        }
    }
    if let Some(bad) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(invalid(format!("entry {} is negative or not finite", bad)));
    }

    let total: f64 = probs.iter().sum();
    if total <= PROB_EPSILON {
        return Err(invalid(format!("probabilities sum to {}", total)));
    }

    Ok(probs.iter().map(|p| p / total).collect())
}

/// Generate one column of `n` values
pub fn generate_column<R: Rng + ?Sized>(spec: &VariableSpec, n: usize, rng: &mut R) -> Result<Column> {
    if n == 0 {
        return Err(PipelineError::InvalidSampleSize(n));
    }
    if let Some((lo, hi)) = spec.clamp {
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(PipelineError::parameter(
                &spec.name,
                format!("clamp range ({}, {}) is not a finite ordered pair", lo, hi),
            ));
        }
    }

    let bad = |reason: String| PipelineError::parameter(&spec.name, reason);

    let column = match &spec.distribution {
        Distribution::Categorical { labels, probs } => {
            let weights = validate_probabilities(&spec.name, labels, probs)?;
            let index = WeightedIndex::new(&weights).map_err(|e| bad(e.to_string()))?;
            let codes = (0..n).map(|_| Some(index.sample(rng) as u32)).collect();
            Column::categorical(&spec.name, CategoricalData::new(labels.clone(), codes)?)
        }
        Distribution::Normal { mean, sd } => {
            let dist = Normal::new(*mean, *sd).map_err(|e| bad(format!("normal: {e}")))?;
            let values = (0..n).map(|_| dist.sample(rng)).collect::<Vec<_>>();
            Column::continuous(&spec.name, finish_continuous(values, spec))
        }
        Distribution::LogNormal { meanlog, sdlog } => {
            let dist = LogNormal::new(*meanlog, *sdlog).map_err(|e| bad(format!("log-normal: {e}")))?;
            let values = (0..n).map(|_| dist.sample(rng)).collect::<Vec<_>>();
            Column::continuous(&spec.name, finish_continuous(values, spec))
        }
        Distribution::Uniform { min, max } => {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(bad(format!("uniform bounds ({}, {}) are invalid", min, max)));
            }
            let values = (0..n).map(|_| rng.gen_range(*min..=*max)).collect::<Vec<_>>();
            Column::continuous(&spec.name, finish_continuous(values, spec))
        }
        Distribution::Poisson { lambda } => {
            let dist = Poisson::new(*lambda).map_err(|e| bad(format!("poisson: {e}")))?;
            let values = (0..n).map(|_| dist.sample(rng) as i64).collect::<Vec<_>>();
            Column::count(&spec.name, finish_count(values, spec))
        }
        Distribution::Binomial { trials, p } => {
            let dist = Binomial::new(*trials, *p).map_err(|e| bad(format!("binomial: {e}")))?;
            let values = (0..n).map(|_| dist.sample(rng) as i64).collect::<Vec<_>>();
            Column::count(&spec.name, finish_count(values, spec))
        }
    };

    Ok(column)
}

/// Draw `n` independent noise terms
pub fn sample_noise<R: Rng + ?Sized>(noise: &NoiseSpec, n: usize, rng: &mut R) -> Result<Vec<f64>> {
    let dist = Normal::new(noise.mean, noise.sd)
        .map_err(|e| PipelineError::parameter("noise", format!("{e}")))?;
    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

/// Round half away from zero to `digits` decimal places
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

fn finish_continuous(values: Vec<f64>, spec: &VariableSpec) -> Vec<Option<f64>> {
    values
        .into_iter()
        .map(|v| {
            let clamped = match spec.clamp {
                Some((lo, hi)) => v.clamp(lo, hi),
                None => v,
            };
            Some(match spec.digits {
                Some(d) => round_to(clamped, d),
                None => clamped,
            })
        })
        .collect()
}

fn finish_count(values: Vec<i64>, spec: &VariableSpec) -> Vec<Option<i64>> {
    let bounds = spec
        .clamp
        .map(|(lo, hi)| (lo.ceil() as i64, hi.floor() as i64));
    values
        .into_iter()
        .map(|v| {
            Some(match bounds {
                Some((lo, hi)) if lo <= hi => v.clamp(lo, hi),
                _ => v,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::table::ColumnData;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_validate_probabilities_normalises() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let probs = validate_probabilities("x", &labels, &[2.0, 6.0]).unwrap();
        assert!((probs[0] - 0.25).abs() < 1e-12);
        assert!((probs[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_validate_probabilities_rejects_bad_vectors() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert!(validate_probabilities("x", &labels, &[1.0]).is_err());
        assert!(validate_probabilities("x", &labels, &[0.0, 0.0]).is_err());
        assert!(validate_probabilities("x", &labels, &[-0.5, 1.5]).is_err());
        assert!(validate_probabilities("x", &labels, &[f64::NAN, 1.0]).is_err());
        assert!(validate_probabilities("x", &[], &[]).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }

    #[test]
    fn test_count_clamp() {
        let mut rng = StdRng::seed_from_u64(3);
        let spec = VariableSpec::poisson("k", 20.0).with_clamp(0.0, 5.0);
        let column = generate_column(&spec, 200, &mut rng).unwrap();
        match column.data {
            ColumnData::Count(values) => {
                assert!(values.iter().flatten().all(|v| (0..=5).contains(v)));
            }
            other => panic!("expected count column, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_zero_rows_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let spec = VariableSpec::normal("x", 0.0, 1.0);
        assert!(matches!(
            generate_column(&spec, 0, &mut rng),
            Err(PipelineError::InvalidSampleSize(0))
        ));
    }
}
