//! Discretization of count and continuous columns into small label sets
//!
//! Two modes: fixed cut-points (clinical thresholds and the like), and a
//! supervised mode that hands a (predictor, outcome) table to an
//! [`AutoBinner`] and takes back one categorical column.

use serde::{Deserialize, Serialize};

use super::autobin::AutoBinConfig;
use super::error::{PipelineError, Result};
use super::table::{CategoricalData, Column, ColumnData, ColumnKind, Dataset, Table};

/// Most labels a discretized predictor may carry
pub const MAX_PREDICTOR_LEVELS: usize = 5;

/// Ordered boundaries B0 < B1 < ... < Bm and one label per interval.
///
/// Intervals are right-closed: v goes to label i when B(i-1) < v <= B(i).
/// B0 itself only belongs to the first interval when `include_lowest` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPoints {
    pub breaks: Vec<f64>,
    pub labels: Vec<String>,
    #[serde(default)]
    pub include_lowest: bool,
}

impl CutPoints {
    pub fn new(breaks: Vec<f64>, labels: &[&str], include_lowest: bool) -> Result<Self> {
        let cuts = Self {
            breaks,
            labels: labels.iter().map(|s| s.to_string()).collect(),
            include_lowest,
        };
        cuts.validate()?;
        Ok(cuts)
    }

    /// Build from contiguous (lower, upper, label) intervals
    pub fn from_intervals(intervals: &[(f64, f64, &str)], include_lowest: bool) -> Result<Self> {
        let Some(first) = intervals.first() else {
            return Err(PipelineError::InvalidBreaks("no intervals given".to_string()));
        };
        let mut breaks = vec![first.0];
        for (i, (lower, upper, _)) in intervals.iter().enumerate() {
            if *lower != breaks[i] {
                return Err(PipelineError::InvalidBreaks(format!(
                    "interval {} starts at {} but the previous one ends at {}",
                    i, lower, breaks[i]
                )));
            }
            breaks.push(*upper);
        }
        let labels: Vec<&str> = intervals.iter().map(|(_, _, l)| *l).collect();
        Self::new(breaks, &labels, include_lowest)
    }

    pub fn validate(&self) -> Result<()> {
        if self.breaks.len() < 2 {
            return Err(PipelineError::InvalidBreaks(
                "at least two boundaries are required".to_string(),
            ));
        }
        if self.breaks.iter().any(|b| b.is_nan()) || self.breaks.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PipelineError::InvalidBreaks(format!(
                "boundaries must be strictly increasing: {:?}",
                self.breaks
            )));
        }
        if self.labels.len() != self.breaks.len() - 1 {
            return Err(PipelineError::InvalidBreaks(format!(
                "{} labels for {} intervals",
                self.labels.len(),
                self.breaks.len() - 1
            )));
        }
        if self.labels.len() > MAX_PREDICTOR_LEVELS {
            return Err(PipelineError::InvalidBreaks(format!(
                "{} labels exceed the predictor limit of {}",
                self.labels.len(),
                MAX_PREDICTOR_LEVELS
            )));
        }
        for (i, label) in self.labels.iter().enumerate() {
            if self.labels[..i].contains(label) {
                return Err(PipelineError::InvalidBreaks(format!("duplicate label '{}'", label)));
            }
        }
        Ok(())
    }

    /// Interval index for a value, `None` outside the covered range
    pub fn assign(&self, value: f64) -> Option<usize> {
        let first = self.breaks[0];
        let last = self.breaks[self.breaks.len() - 1];
        if value.is_nan() || value < first || value > last {
            return None;
        }
        if value == first {
            return self.include_lowest.then_some(0);
        }
        Some(self.breaks.partition_point(|&b| b < value) - 1)
    }
}

/// Discretization rule for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BinSpec {
    Fixed(CutPoints),
    /// Cut-points chosen from the outcome by an auto-binner
    Supervised(AutoBinConfig),
}

/// Apply fixed cut-points to a column.
///
/// Categorical columns pass through unchanged, so re-discretizing is a no-op.
pub fn discretize(column: &Column, cuts: &CutPoints) -> Result<Column> {
    cuts.validate()?;
    let codes: Vec<Option<u32>> = match &column.data {
        ColumnData::Categorical(_) => return Ok(column.clone()),
        data => (0..data.len())
            .map(|row| data.numeric(row).and_then(|v| cuts.assign(v)).map(|i| i as u32))
            .collect(),
    };
    let data = CategoricalData::new(cuts.labels.clone(), codes)?;
    Ok(Column::categorical(&column.name, data))
}

/// Supervised binning collaborator.
///
/// Receives a two-column table (predictor first, fully observed categorical
/// outcome last) and returns one label per row of that table.
pub trait AutoBinner {
    fn auto_bin(&self, table: &Table, predictor_index: usize) -> Result<CategoricalData>;
}

/// Check the shape an auto-binner expects before calling it
pub fn check_autobin_input(table: &Table, predictor_index: usize) -> Result<()> {
    let fail = |msg: String| Err(PipelineError::PreconditionFailed(msg));

    if table.n_cols() != 2 {
        return fail(format!("auto-binning needs 2 columns, got {}", table.n_cols()));
    }
    if predictor_index != 0 {
        return fail(format!(
            "predictor index must be 0 (outcome last), got {}",
            predictor_index
        ));
    }
    let predictor = &table.columns()[0];
    let outcome = &table.columns()[1];
    if predictor.kind() == ColumnKind::Categorical {
        return fail(format!("predictor '{}' is already categorical", predictor.name));
    }
    if outcome.kind() != ColumnKind::Categorical {
        return fail(format!("outcome '{}' must be categorical", outcome.name));
    }
    if outcome.missing_count() > 0 {
        return fail(format!(
            "outcome '{}' has {} missing values",
            outcome.name,
            outcome.missing_count()
        ));
    }
    if table.n_rows() == 0 {
        return fail("auto-binning table is empty".to_string());
    }
    Ok(())
}

/// Bin a predictor against the outcome using only rows where the outcome is
/// observed; rows with a missing outcome come back missing.
pub fn bin_supervised(binner: &dyn AutoBinner, predictor: &Column, outcome: &Column) -> Result<Column> {
    if predictor.kind() == ColumnKind::Categorical {
        return Ok(predictor.clone());
    }
    if predictor.len() != outcome.len() {
        return Err(PipelineError::LengthMismatch {
            column: predictor.name.clone(),
            expected: outcome.len(),
            actual: predictor.len(),
        });
    }

    let keep: Vec<bool> = (0..outcome.len()).map(|i| !outcome.data.is_missing(i)).collect();
    let observed = Dataset::filter_rows(vec![predictor.clone(), outcome.clone()], &keep);
    let table = Table::from_columns(observed)?;

    check_autobin_input(&table, 0)?;
    let binned = binner.auto_bin(&table, 0)?;

    if binned.len() != table.n_rows() {
        return Err(PipelineError::PreconditionFailed(format!(
            "auto-binner returned {} labels for {} rows",
            binned.len(),
            table.n_rows()
        )));
    }
    if binned.levels().len() > MAX_PREDICTOR_LEVELS {
        return Err(PipelineError::CardinalityExceeded {
            column: predictor.name.clone(),
            levels: binned.levels().len(),
            max: MAX_PREDICTOR_LEVELS,
        });
    }

    let mut observed_codes = binned.codes().iter();
    let codes = keep
        .iter()
        .map(|&k| if k { observed_codes.next().copied().flatten() } else { None })
        .collect();
    let data = CategoricalData::new(binned.levels().to_vec(), codes)?;
    Ok(Column::categorical(&predictor.name, data))
}
