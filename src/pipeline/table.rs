//! Typed column storage shared by every pipeline stage
//!
//! A [`Table`] is the mutable working structure the stages transform in place.
//! The [`Dataset`] is what the assembler hands to a miner: outcome last, fully
//! observed, and read-only from then on.

use std::collections::HashSet;
use std::fmt;

use polars::prelude::{Column as PlColumn, DataFrame};
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, Result};

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Categorical,
    Count,
    Continuous,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Count => write!(f, "count"),
            ColumnKind::Continuous => write!(f, "continuous"),
        }
    }
}

/// Categorical values stored as codes into an ordered level set.
///
/// The level set is the column's declared domain: levels may exist that no
/// row currently uses.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalData {
    levels: Vec<String>,
    codes: Vec<Option<u32>>,
}

impl CategoricalData {
    /// Build from levels and codes, validating that every code indexes a level
    pub fn new(levels: Vec<String>, codes: Vec<Option<u32>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for level in &levels {
            if !seen.insert(level.as_str()) {
                return Err(PipelineError::parameter(
                    "levels",
                    format!("duplicate level '{}'", level),
                ));
            }
        }
        if let Some(bad) = codes.iter().flatten().find(|&&c| c as usize >= levels.len()) {
            return Err(PipelineError::PreconditionFailed(format!(
                "code {} out of range for {} levels",
                bad,
                levels.len()
            )));
        }
        Ok(Self { levels, codes })
    }

    /// Build from label values; labels not present in `levels` are rejected
    pub fn from_labels<S: AsRef<str>>(levels: Vec<String>, values: &[Option<S>]) -> Result<Self> {
        let codes = values
            .iter()
            .map(|v| match v {
                None => Ok(None),
                Some(label) => levels
                    .iter()
                    .position(|l| l == label.as_ref())
                    .map(|i| Some(i as u32))
                    .ok_or_else(|| {
                        PipelineError::PreconditionFailed(format!(
                            "label '{}' is not one of the declared levels",
                            label.as_ref()
                        ))
                    }),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(levels, codes)
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Label at a row, `None` when missing
    pub fn label(&self, row: usize) -> Option<&str> {
        self.codes[row].map(|c| self.levels[c as usize].as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.codes
            .iter()
            .map(|c| c.map(|c| self.levels[c as usize].as_str()))
    }

    /// Number of distinct levels actually observed (missing excluded)
    pub fn observed_levels(&self) -> usize {
        self.codes.iter().flatten().collect::<HashSet<_>>().len()
    }
}

/// Per-row storage for one column; `None` is the missing marker
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Categorical(CategoricalData),
    Count(Vec<Option<i64>>),
    Continuous(Vec<Option<f64>>),
}

impl ColumnData {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Categorical(_) => ColumnKind::Categorical,
            ColumnData::Count(_) => ColumnKind::Count,
            ColumnData::Continuous(_) => ColumnKind::Continuous,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Categorical(c) => c.len(),
            ColumnData::Count(v) => v.len(),
            ColumnData::Continuous(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Categorical(c) => c.codes[row].is_none(),
            ColumnData::Count(v) => v[row].is_none(),
            ColumnData::Continuous(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    pub(crate) fn set_missing(&mut self, row: usize) {
        match self {
            ColumnData::Categorical(c) => c.codes[row] = None,
            ColumnData::Count(v) => v[row] = None,
            ColumnData::Continuous(v) => v[row] = None,
        }
    }

    /// Numeric view of a row; categorical columns have none
    pub fn numeric(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Categorical(_) => None,
            ColumnData::Count(v) => v[row].map(|x| x as f64),
            ColumnData::Continuous(v) => v[row],
        }
    }

    /// Distinct non-missing values
    pub fn distinct_levels(&self) -> usize {
        match self {
            ColumnData::Categorical(c) => c.observed_levels(),
            ColumnData::Count(v) => v.iter().flatten().collect::<HashSet<_>>().len(),
            ColumnData::Continuous(v) => v
                .iter()
                .flatten()
                .map(|x| x.to_bits())
                .collect::<HashSet<_>>()
                .len(),
        }
    }

    /// Keep only rows whose flag is set
    fn filter(&self, keep: &[bool]) -> ColumnData {
        fn pick<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| v.clone())
                .collect()
        }
        match self {
            ColumnData::Categorical(c) => ColumnData::Categorical(CategoricalData {
                levels: c.levels.clone(),
                codes: pick(&c.codes, keep),
            }),
            ColumnData::Count(v) => ColumnData::Count(pick(v, keep)),
            ColumnData::Continuous(v) => ColumnData::Continuous(pick(v, keep)),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn categorical(name: impl Into<String>, data: CategoricalData) -> Self {
        Self::new(name, ColumnData::Categorical(data))
    }

    pub fn count(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Count(values))
    }

    pub fn continuous(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Continuous(values))
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.data.missing_count()
    }

    /// Borrow the categorical payload or report the kind mismatch
    pub fn as_categorical(&self) -> Result<&CategoricalData> {
        match &self.data {
            ColumnData::Categorical(c) => Ok(c),
            other => Err(PipelineError::KindMismatch {
                column: self.name.clone(),
                expected: ColumnKind::Categorical,
                actual: other.kind(),
            }),
        }
    }

    fn to_polars(&self) -> PlColumn {
        let name = self.name.as_str().into();
        match &self.data {
            ColumnData::Categorical(c) => {
                let values: Vec<Option<&str>> = c.labels().collect();
                PlColumn::new(name, values)
            }
            ColumnData::Count(v) => PlColumn::new(name, v.clone()),
            ColumnData::Continuous(v) => PlColumn::new(name, v.clone()),
        }
    }
}

/// Ordered, name-unique set of equal-length columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    n_rows: usize,
    columns: Vec<Column>,
}

impl Table {
    /// Empty table whose columns must all have `n_rows` rows
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: Vec::new(),
        }
    }

    /// Build from columns, checking lengths and names
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut table = Table::new(n_rows);
        for column in columns {
            table.push(column)?;
        }
        Ok(table)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn push(&mut self, column: Column) -> Result<()> {
        if self.index_of(&column.name).is_some() {
            return Err(PipelineError::DuplicateColumn(column.name));
        }
        self.check_length(&column)?;
        self.columns.push(column);
        Ok(())
    }

    /// Swap in a same-named column, keeping its position
    pub fn replace(&mut self, column: Column) -> Result<Column> {
        let idx = self
            .index_of(&column.name)
            .ok_or_else(|| PipelineError::UnknownColumn(column.name.clone()))?;
        self.check_length(&column)?;
        Ok(std::mem::replace(&mut self.columns[idx], column))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }

    /// Look a column up and require a semantic type
    pub fn expect_kind(&self, name: &str, kinds: &[ColumnKind]) -> Result<&Column> {
        let column = self.get(name)?;
        if kinds.contains(&column.kind()) {
            Ok(column)
        } else {
            Err(PipelineError::KindMismatch {
                column: name.to_string(),
                expected: kinds[0],
                actual: column.kind(),
            })
        }
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Convert to a polars DataFrame (categorical columns become strings)
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        to_dataframe(&self.columns)
    }

    fn check_length(&self, column: &Column) -> Result<()> {
        if column.len() != self.n_rows {
            return Err(PipelineError::LengthMismatch {
                column: column.name.clone(),
                expected: self.n_rows,
                actual: column.len(),
            });
        }
        Ok(())
    }
}

/// An assembled dataset ready for mining.
///
/// The outcome is the last column, categorical, and contains no missing cells.
/// There are no mutating methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    n_rows: usize,
    columns: Vec<Column>,
}

impl Dataset {
    /// Crate-internal: only the assembler builds datasets
    pub(crate) fn from_parts(n_rows: usize, columns: Vec<Column>) -> Self {
        Self { n_rows, columns }
    }

    /// Keep rows whose flag is set
    pub(crate) fn filter_rows(columns: Vec<Column>, keep: &[bool]) -> Vec<Column> {
        columns
            .into_iter()
            .map(|c| Column::new(c.name, c.data.filter(keep)))
            .collect()
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All columns but the outcome, in order
    pub fn predictors(&self) -> &[Column] {
        match self.columns.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    pub fn outcome(&self) -> Option<&Column> {
        self.columns.last()
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        to_dataframe(&self.columns)
    }
}

fn to_dataframe(columns: &[Column]) -> Result<DataFrame> {
    let columns: Vec<PlColumn> = columns.iter().map(Column::to_polars).collect();
    Ok(DataFrame::new(columns)?)
}
