//! Shared test utilities and fixture builders

#![allow(dead_code)]

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use synthmine::pipeline::{
    assemble, AssemblyOptions, BinSpec, CategoricalData, Column, CutPoints, Dataset, MinerConfig, MiningRequest,
    NoiseSpec, OutcomeBinning, OutcomeSpec, OutcomeTerm, Table, VariableSpec,
};
use synthmine::scenario::{BinRule, ScenarioConfig};
use tempfile::TempDir;

/// Categorical column with levels "0".."levels-1"
pub fn categorical(name: &str, levels: usize, codes: Vec<Option<u32>>) -> Column {
    let labels = (0..levels).map(|l| l.to_string()).collect();
    Column::categorical(name, CategoricalData::new(labels, codes).unwrap())
}

/// Dataset where `signal` determines the outcome up to 10% label flips and
/// `noise` is independent of it
pub fn signal_and_noise_dataset(rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let signal: Vec<u32> = (0..rows).map(|_| rng.gen_range(0..3)).collect();
    let noise: Vec<u32> = (0..rows).map(|_| rng.gen_range(0..3)).collect();
    let outcome: Vec<u32> = signal
        .iter()
        .map(|&s| if rng.gen_bool(0.9) { s } else { rng.gen_range(0..3) })
        .collect();

    let table = Table::from_columns(vec![
        categorical("noise", 3, noise.into_iter().map(Some).collect()),
        categorical("signal", 3, signal.into_iter().map(Some).collect()),
        categorical("y", 3, outcome.into_iter().map(Some).collect()),
    ])
    .unwrap();
    let (dataset, _) = assemble(table, "y", &AssemblyOptions::default()).unwrap();
    dataset
}

/// Single continuous predictor, noise-free linear score, quantile outcome
pub fn linear_quantile_config(rows: usize, k: usize) -> ScenarioConfig {
    let cuts = CutPoints {
        breaks: vec![0.0, 25.0, 50.0, 75.0, 100.0],
        labels: vec!["q1".into(), "q2".into(), "q3".into(), "q4".into()],
        include_lowest: true,
    };
    ScenarioConfig {
        name: "linear-quantile".to_string(),
        description: String::new(),
        seed: 500,
        rows,
        variables: vec![VariableSpec::uniform("x", 0.0, 100.0)],
        outcome: OutcomeSpec {
            name: "y".to_string(),
            terms: vec![OutcomeTerm::numeric("x", 2.0)],
            intercept: 1.0,
            noise: NoiseSpec { mean: 0.0, sd: 0.0 },
            binning: OutcomeBinning::Quantile { k },
        },
        missingness: None,
        bins: vec![BinRule::new("x", BinSpec::Fixed(cuts))],
        assembly: AssemblyOptions::default(),
        mining: MiningRequest::default(),
        miner: MinerConfig::default(),
    }
}

/// Count rows per outcome level
pub fn level_counts(column: &Column) -> Vec<usize> {
    let data = column.as_categorical().unwrap();
    let mut counts = vec![0; data.levels().len()];
    for code in data.codes().iter().flatten() {
        counts[*code as usize] += 1;
    }
    counts
}

/// Rows that are missing in a column
pub fn missing_rows(column: &Column) -> Vec<usize> {
    (0..column.len()).filter(|&i| column.data.is_missing(i)).collect()
}

/// Temp directory plus a path inside it
pub fn temp_path(file_name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(file_name);
    (dir, path)
}
