//! Dataset assembly: outcome last, unobserved outcomes dropped,
//! predictor cardinality checked

use serde::{Deserialize, Serialize};

use super::discretize::MAX_PREDICTOR_LEVELS;
use super::error::{PipelineError, Result};
use super::outcome::MAX_OUTCOME_LEVELS;
use super::table::{ColumnKind, Dataset, Table};

/// Practical ceiling on distinct levels for a minable predictor
pub const DEFAULT_MAX_LEVELS: usize = 10;

fn default_warn_levels() -> usize {
    MAX_PREDICTOR_LEVELS
}

fn default_max_levels() -> usize {
    DEFAULT_MAX_LEVELS
}

/// Cardinality limits applied at assembly time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// Predictors above this many levels produce a warning
    #[serde(default = "default_warn_levels")]
    pub warn_levels: usize,
    /// Predictors above this many levels reject the dataset
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            warn_levels: default_warn_levels(),
            max_levels: default_max_levels(),
        }
    }
}

/// What assembly did to the table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssemblyReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub warnings: Vec<String>,
}

impl AssemblyReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Reorder the outcome to the last position, drop rows with a missing
/// outcome, and check every predictor is categorical with few levels.
///
/// Predictors over `warn_levels` are reported, never truncated.
pub fn assemble(table: Table, outcome: &str, options: &AssemblyOptions) -> Result<(Dataset, AssemblyReport)> {
    if options.warn_levels > options.max_levels {
        return Err(PipelineError::parameter(
            "assembly",
            format!(
                "warn_levels ({}) exceeds max_levels ({})",
                options.warn_levels, options.max_levels
            ),
        ));
    }

    let outcome_idx = table
        .index_of(outcome)
        .ok_or_else(|| PipelineError::UnknownColumn(outcome.to_string()))?;
    table.expect_kind(outcome, &[ColumnKind::Categorical])?;

    let rows_before = table.n_rows();
    let mut columns = table.into_columns();
    let outcome_column = columns.remove(outcome_idx);
    columns.push(outcome_column);

    let keep: Vec<bool> = {
        let outcome_data = &columns[columns.len() - 1].data;
        (0..rows_before).map(|i| !outcome_data.is_missing(i)).collect()
    };
    let rows_after = keep.iter().filter(|&&k| k).count();
    let columns = if rows_after < rows_before {
        Dataset::filter_rows(columns, &keep)
    } else {
        columns
    };

    if rows_after == 0 {
        return Err(PipelineError::PreconditionFailed(format!(
            "outcome '{}' is missing in every row",
            outcome
        )));
    }

    let mut warnings = Vec::new();
    let (outcome_column, predictors) = columns
        .split_last()
        .ok_or_else(|| PipelineError::PreconditionFailed("dataset has no columns".to_string()))?;

    let outcome_levels = outcome_column.data.distinct_levels();
    if outcome_levels > MAX_OUTCOME_LEVELS {
        return Err(PipelineError::CardinalityExceeded {
            column: outcome.to_string(),
            levels: outcome_levels,
            max: MAX_OUTCOME_LEVELS,
        });
    }
    if outcome_levels < 2 {
        warnings.push(format!(
            "outcome '{}' has a single observed level; associations are undefined",
            outcome
        ));
    }

    for column in predictors {
        if column.kind() != ColumnKind::Categorical {
            return Err(PipelineError::KindMismatch {
                column: column.name.clone(),
                expected: ColumnKind::Categorical,
                actual: column.kind(),
            });
        }
        let levels = column.data.distinct_levels();
        if levels > options.max_levels {
            return Err(PipelineError::CardinalityExceeded {
                column: column.name.clone(),
                levels,
                max: options.max_levels,
            });
        }
        if levels > options.warn_levels {
            warnings.push(format!(
                "predictor '{}' has {} levels (more than {}); combinations grow quickly",
                column.name, levels, options.warn_levels
            ));
        }
    }

    let report = AssemblyReport {
        rows_before,
        rows_after,
        warnings,
    };
    Ok((Dataset::from_parts(rows_after, columns), report))
}
