//! Association mining over combinations of predictors
//!
//! The miner itself is a collaborator behind [`AssociationMiner`]. This module
//! owns the contract: the request and result types, the preconditions every
//! dataset must meet before a miner sees it, and the final ranking.

mod contingency;
mod stats;

use serde::{Deserialize, Serialize};

use super::assemble::DEFAULT_MAX_LEVELS;
use super::error::{PipelineError, Result};
use super::table::{ColumnKind, Dataset};

pub use contingency::{ContingencyMiner, MinerConfig};
pub use stats::{bias_corrected_cramers_v, chi_square_z, normal_upper_tail, ContingencyStat};

/// Number of results returned when the request leaves it open
pub const DEFAULT_RESULT_COUNT: usize = 3;

/// What to mine for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningRequest {
    /// Fixed combination size; `None` lets the miner choose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combination_size: Option<usize>,
    /// Number of ranked results; defaults to [`DEFAULT_RESULT_COUNT`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<usize>,
}

impl MiningRequest {
    pub fn result_count(&self) -> usize {
        self.result_count.unwrap_or(DEFAULT_RESULT_COUNT)
    }
}

/// One ranked variable combination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationResult {
    pub variables: Vec<String>,
    /// Association strength (higher is stronger)
    pub estimate: f64,
    pub confidence_interval: (f64, f64),
    pub z_score: f64,
    pub p_value: f64,
}

/// An association miner: ranks predictor combinations against the outcome
pub trait AssociationMiner {
    fn mine(&self, dataset: &Dataset, request: &MiningRequest) -> Result<Vec<CombinationResult>>;
}

/// Check everything a miner may assume about its input
pub fn check_preconditions(dataset: &Dataset, request: &MiningRequest) -> Result<()> {
    let fail = |msg: String| Err(PipelineError::PreconditionFailed(msg));

    let Some(outcome) = dataset.outcome() else {
        return fail("dataset has no columns".to_string());
    };
    let predictors = dataset.predictors();
    if predictors.is_empty() {
        return fail("dataset has no predictor columns".to_string());
    }
    if outcome.kind() != ColumnKind::Categorical {
        return fail(format!("outcome '{}' (last column) is not categorical", outcome.name));
    }
    if outcome.missing_count() > 0 {
        return fail(format!(
            "outcome '{}' has {} missing values",
            outcome.name,
            outcome.missing_count()
        ));
    }
    for column in predictors {
        if column.kind() != ColumnKind::Categorical {
            return fail(format!("predictor '{}' is {}, not categorical", column.name, column.kind()));
        }
        let levels = column.data.distinct_levels();
        if levels > DEFAULT_MAX_LEVELS {
            return Err(PipelineError::CardinalityExceeded {
                column: column.name.clone(),
                levels,
                max: DEFAULT_MAX_LEVELS,
            });
        }
    }
    if let Some(k) = request.combination_size {
        if k == 0 || k > predictors.len() {
            return fail(format!(
                "combination size {} is outside 1..={}",
                k,
                predictors.len()
            ));
        }
    }
    if request.result_count == Some(0) {
        return fail("result count must be at least 1".to_string());
    }
    Ok(())
}

/// Validate the dataset, call the miner, and rank its results by strength
pub fn invoke_miner(
    miner: &dyn AssociationMiner,
    dataset: &Dataset,
    request: &MiningRequest,
) -> Result<Vec<CombinationResult>> {
    check_preconditions(dataset, request)?;

    let mut results = miner.mine(dataset, request)?;
    results.sort_by(|a, b| b.estimate.total_cmp(&a.estimate));
    results.truncate(request.result_count());
    Ok(results)
}
