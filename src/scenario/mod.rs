//! Scenario module - named, reproducible pipeline runs

pub mod config;
pub mod presets;
pub mod runner;

pub use config::{BinRule, ScenarioConfig};
pub use runner::{build_dataset, mine_dataset, run_scenario, BuiltDataset, ScenarioOverrides};
