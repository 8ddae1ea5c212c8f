//! Tests for the command-line interface

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use synthmine::cli::{Cli, Commands};
use synthmine::pipeline::VariableSpec;
use synthmine::scenario::{presets, ScenarioConfig};

#[path = "common/mod.rs"]
mod common;

fn synthmine() -> Command {
    Command::cargo_bin("synthmine").unwrap()
}

#[test]
fn test_cli_run_flags() {
    let cli = Cli::parse_from([
        "synthmine",
        "run",
        "clinical-mixed",
        "--rows",
        "300",
        "--results",
        "4",
        "--reseed-missing",
        "8",
        "--no-mine",
    ]);
    let Commands::Run(args) = cli.command else {
        panic!("expected the run subcommand");
    };
    assert_eq!(args.name.as_deref(), Some("clinical-mixed"));
    assert_eq!(args.rows, Some(300));
    assert_eq!(args.results, Some(4));
    assert_eq!(args.reseed_missing, Some(8));
    assert!(args.no_mine);
    assert!(args.output.is_none());
}

#[test]
fn test_cli_rejects_bad_values() {
    assert!(Cli::try_parse_from(["synthmine", "run", "x", "--rows", "0"]).is_err());
    assert!(Cli::try_parse_from(["synthmine", "run", "x", "-k", "0"]).is_err());
    assert!(Cli::try_parse_from(["synthmine", "run", "x", "--output", "data.xlsx"]).is_err());
}

#[test]
fn test_list_shows_presets() {
    let mut assert = synthmine().arg("list").assert().success();
    for name in presets::PRESET_NAMES {
        assert = assert.stdout(predicate::str::contains(name));
    }
}

#[test]
fn test_show_prints_loadable_json() {
    let output = synthmine().args(["show", "disjoint-missing"]).output().unwrap();
    assert!(output.status.success());
    let config: ScenarioConfig = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config, presets::disjoint_missing());
}

#[test]
fn test_unknown_scenario_fails() {
    synthmine()
        .args(["run", "no-such-scenario"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown scenario"));
}

#[test]
fn test_run_writes_dataset_and_report() {
    let (dir, csv_path) = common::temp_path("dataset.csv");
    let json_path = dir.path().join("report.json");

    synthmine()
        .args(["run", "ordinal-weights", "--rows", "200", "--results", "2", "--quiet", "-k", "1"])
        .arg("--output")
        .arg(&csv_path)
        .arg("--export-json")
        .arg(&json_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("TOP COMBINATIONS"));

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let header = csv.lines().next().unwrap();
    assert_eq!(header, "V1,V2,V3,V4,V5,V6,V7,V8,V9,V10,Y");
    assert_eq!(csv.lines().count(), 201);

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(report["metadata"]["scenario"], "ordinal-weights");
    assert_eq!(report["dataset"]["rows"], 200);
    assert_eq!(report["results"].as_array().unwrap().len(), 2);
}

#[test]
fn test_run_from_config_file() {
    let (dir, config_path) = common::temp_path("scenario.json");
    let mut config = presets::disjoint_missing();
    config.rows = 120;
    config.missingness.as_mut().unwrap().amount = synthmine::pipeline::MissingAmount::Count(10);
    std::fs::write(&config_path, config.to_json().unwrap()).unwrap();
    let json_path = dir.path().join("report.json");

    synthmine()
        .arg("run")
        .arg("--config")
        .arg(&config_path)
        .arg("--no-mine")
        .arg("--export-json")
        .arg(&json_path)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(report["dataset"]["rows"], 120);
    assert!(report.get("results").is_none());
}

#[test]
fn test_invalid_probabilities_reported_as_configuration_error() {
    let (_dir, config_path) = common::temp_path("broken.json");
    let mut config = presets::disjoint_missing();
    config.variables[0] = VariableSpec::categorical("C1", &["a", "b"], &[0.0, 0.0]);
    std::fs::write(&config_path, config.to_json().unwrap()).unwrap();

    synthmine()
        .arg("run")
        .arg("--config")
        .arg(&config_path)
        .arg("--no-mine")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Scenario configuration rejected"))
        .stderr(predicate::str::contains("Invalid probability vector"));
}
