//! Drives one scenario through the pipeline stages in order

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::ScenarioConfig;
use crate::pipeline::{
    assemble, bin_supervised, discretize, generate_column, inject_table, invoke_miner, synthesize_outcome,
    AssemblyReport, BinSpec, CartBinner, CombinationResult, ContingencyMiner, Dataset, MissingnessStage, Table,
};

/// Command-line adjustments applied on top of a scenario config
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub seed: Option<u64>,
    pub rows: Option<usize>,
    pub combination_size: Option<usize>,
    pub results: Option<usize>,
    pub reseed_missing: Option<u64>,
    pub show_progress: bool,
}

impl ScenarioOverrides {
    pub fn apply(&self, config: &mut ScenarioConfig) -> Result<()> {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(k) = self.combination_size {
            config.mining.combination_size = Some(k);
        }
        if let Some(n) = self.results {
            config.mining.result_count = Some(n);
        }
        if let Some(seed) = self.reseed_missing {
            match config.missingness.as_mut() {
                Some(missing) => missing.reseed = Some(seed),
                None => bail!("Scenario '{}' injects no missing values to reseed", config.name),
            }
        }
        config.miner.show_progress = self.show_progress;
        config.validate()
    }
}

/// Assembled dataset plus what happened on the way
#[derive(Debug, Clone)]
pub struct BuiltDataset {
    pub dataset: Dataset,
    pub assembly: AssemblyReport,
    /// Cells blanked per column, in injection order
    pub injected: Vec<(String, usize)>,
}

/// Generate, degrade, discretize and assemble the scenario's dataset.
///
/// One `StdRng` seeded from `config.seed` feeds every stage, so equal
/// configs give identical datasets.
pub fn build_dataset(config: &ScenarioConfig) -> Result<BuiltDataset> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let outcome = config.outcome.name.as_str();

    let mut table = Table::new(config.rows);
    for spec in &config.variables {
        let column = generate_column(spec, config.rows, &mut rng)
            .with_context(|| format!("Failed to generate variable '{}'", spec.name))?;
        table.push(column)?;
    }

    let mut injected = Vec::new();
    let inject = |table: &mut Table, rng: &mut StdRng, injected: &mut Vec<(String, usize)>| -> Result<()> {
        if let Some(missing) = &config.missingness {
            let chosen = inject_table(table, missing, Some(outcome), rng).context("Failed to inject missing values")?;
            injected.extend(chosen.into_iter().map(|(name, rows)| (name, rows.len())));
        }
        Ok(())
    };

    let stage = config.missingness.as_ref().map(|m| m.stage);
    if stage == Some(MissingnessStage::BeforeOutcome) {
        inject(&mut table, &mut rng, &mut injected)?;
    }

    let outcome_column = synthesize_outcome(&table, &config.outcome, &mut rng)
        .with_context(|| format!("Failed to synthesize outcome '{}'", outcome))?;
    table.push(outcome_column)?;

    if stage == Some(MissingnessStage::AfterOutcome) {
        inject(&mut table, &mut rng, &mut injected)?;
    }

    for rule in &config.bins {
        let column = table.get(&rule.column)?;
        let binned = match &rule.rule {
            BinSpec::Fixed(cuts) => discretize(column, cuts),
            BinSpec::Supervised(auto) => {
                let binner = CartBinner::new(auto.clone())?;
                bin_supervised(&binner, column, table.get(outcome)?)
            }
        }
        .with_context(|| format!("Failed to discretize '{}'", rule.column))?;
        table.replace(binned)?;
    }

    let (dataset, assembly) = assemble(table, outcome, &config.assembly).context("Failed to assemble dataset")?;

    Ok(BuiltDataset {
        dataset,
        assembly,
        injected,
    })
}

/// Rank predictor combinations with the scenario's miner settings
pub fn mine_dataset(dataset: &Dataset, config: &ScenarioConfig) -> Result<Vec<CombinationResult>> {
    let miner = ContingencyMiner::new(config.miner.clone())?;
    invoke_miner(&miner, dataset, &config.mining).context("Association mining failed")
}

/// Build the dataset and, when asked, mine it
pub fn run_scenario(config: &ScenarioConfig, mine: bool) -> Result<(BuiltDataset, Option<Vec<CombinationResult>>)> {
    let built = build_dataset(config)?;
    let results = if mine {
        Some(mine_dataset(&built.dataset, config)?)
    } else {
        None
    };
    Ok((built, results))
}
