//! Declarative scenario configuration (JSON)

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::{
    AssemblyOptions, BinSpec, MinerConfig, MiningRequest, MissingnessConfig, OutcomeSpec, VariableSpec,
};

/// Discretization rule bound to one generated column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinRule {
    pub column: String,
    pub rule: BinSpec,
}

impl BinRule {
    pub fn new(column: impl Into<String>, rule: BinSpec) -> Self {
        Self {
            column: column.into(),
            rule,
        }
    }
}

/// Everything needed to reproduce one synthetic-data run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub seed: u64,
    pub rows: usize,
    pub variables: Vec<VariableSpec>,
    pub outcome: OutcomeSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missingness: Option<MissingnessConfig>,
    #[serde(default)]
    pub bins: Vec<BinRule>,
    #[serde(default)]
    pub assembly: AssemblyOptions,
    #[serde(default)]
    pub mining: MiningRequest,
    #[serde(default)]
    pub miner: MinerConfig,
}

impl ScenarioConfig {
    /// Load a scenario from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        let config: ScenarioConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scenario file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scenario config")
    }

    /// Cross-field checks that serde cannot express.
    ///
    /// Per-stage parameters (probabilities, breaks, k) are validated by the
    /// stage that uses them.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            bail!("Scenario '{}' must generate at least one row", self.name);
        }
        if self.variables.is_empty() {
            bail!("Scenario '{}' declares no variables", self.name);
        }

        let mut names = HashSet::new();
        for variable in &self.variables {
            if !names.insert(variable.name.as_str()) {
                bail!("Variable '{}' is declared more than once", variable.name);
            }
        }
        if names.contains(self.outcome.name.as_str()) {
            bail!(
                "Outcome name '{}' clashes with a generated variable",
                self.outcome.name
            );
        }
        for term in &self.outcome.terms {
            if !names.contains(term.column.as_str()) {
                bail!("Outcome term refers to unknown variable '{}'", term.column);
            }
        }

        let mut binned = HashSet::new();
        for rule in &self.bins {
            if !names.contains(rule.column.as_str()) {
                bail!("Bin rule refers to unknown variable '{}'", rule.column);
            }
            if !binned.insert(rule.column.as_str()) {
                bail!("Variable '{}' has more than one bin rule", rule.column);
            }
        }

        if let Some(missing) = &self.missingness {
            for column in &missing.columns {
                if column != &self.outcome.name && !names.contains(column.as_str()) {
                    bail!("Missingness refers to unknown column '{}'", column);
                }
            }
        }
        Ok(())
    }
}
