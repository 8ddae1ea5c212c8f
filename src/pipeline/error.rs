//! Error types for the generation, discretization and mining pipeline.
//!
//! Configuration errors are raised before any sampling happens. Contract
//! violations are raised before a table is handed to a binner or miner.
//! Missing values flowing through the stages are never an error.

use thiserror::Error;

use super::table::ColumnKind;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Probability vector does not fit the label set or cannot be normalised.
    #[error("Invalid probability vector for '{column}': {reason}")]
    InvalidProbabilities { column: String, reason: String },

    /// Sample size of zero (or a column length that disagrees with n).
    #[error("Sample size must be positive, got {0}")]
    InvalidSampleSize(usize),

    /// A distribution or stage parameter is out of range.
    #[error("Invalid parameter for '{context}': {reason}")]
    InvalidParameter { context: String, reason: String },

    /// Cut-points are not strictly increasing or do not match the labels.
    #[error("Invalid cut-points: {0}")]
    InvalidBreaks(String),

    /// Ordinal level order does not cover the column's labels.
    #[error("Invalid ordinal encoding for '{column}': {reason}")]
    InvalidEncoding { column: String, reason: String },

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    /// A column was used where a different semantic type is required.
    #[error("Column '{column}' is {actual}, expected {expected}")]
    KindMismatch {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// More missing cells requested than there are rows available.
    #[error("Cannot mark {requested} cells missing in '{column}': only {available} rows available")]
    TooManyMissing {
        column: String,
        requested: usize,
        available: usize,
    },

    /// Predictor has more levels than the combinatorial ceiling allows.
    #[error("Column '{column}' has {levels} distinct levels (ceiling is {max})")]
    CardinalityExceeded {
        column: String,
        levels: usize,
        max: usize,
    },

    /// Shape or content precondition of a binner or miner is violated.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn parameter(context: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::InvalidParameter {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// True for errors detected while validating configuration.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            PipelineError::PreconditionFailed(_)
                | PipelineError::CardinalityExceeded { .. }
                | PipelineError::Polars(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_grouped() {
        assert!(PipelineError::InvalidBreaks("x".to_string()).is_configuration());
        assert!(PipelineError::TooManyMissing {
            column: "a".to_string(),
            requested: 5,
            available: 4,
        }
        .is_configuration());
        assert!(!PipelineError::PreconditionFailed("x".to_string()).is_configuration());
        assert!(!PipelineError::CardinalityExceeded {
            column: "a".to_string(),
            levels: 12,
            max: 10,
        }
        .is_configuration());
    }
}
