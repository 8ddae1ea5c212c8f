//! End-to-end scenario tests

use synthmine::pipeline::{
    ColumnKind, MiningRequest, MissingAmount, MissingnessConfig, MissingnessPolicy, MissingnessStage,
};
use synthmine::report::{build_run_export, sparse_predictors};
use synthmine::scenario::{build_dataset, presets, run_scenario};

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_ordinal_weights_shape_and_missingness() {
    let config = presets::ordinal_weights();
    assert_eq!(config.rows, 1000);
    assert_eq!(config.seed, 123);

    let built = build_dataset(&config).unwrap();
    let dataset = &built.dataset;

    assert_eq!(dataset.n_rows(), 1000);
    assert_eq!(dataset.n_cols(), 11);
    assert_eq!(built.assembly.rows_dropped(), 0);

    for column in dataset.predictors() {
        assert_eq!(
            column.missing_count(),
            5,
            "{} should have exactly 5 missing cells",
            column.name
        );
    }
    let outcome = dataset.outcome().unwrap();
    assert_eq!(outcome.name, "Y");
    assert_eq!(outcome.missing_count(), 0);
}

#[test]
fn test_ordinal_weights_equal_frequency_deciles() {
    let built = build_dataset(&presets::ordinal_weights()).unwrap();
    let counts = common::level_counts(built.dataset.outcome().unwrap());
    assert_eq!(counts, vec![100; 10]);
}

#[test]
fn test_quantile_deciles_of_linear_score() {
    let config = common::linear_quantile_config(500, 10);
    let built = build_dataset(&config).unwrap();
    let counts = common::level_counts(built.dataset.outcome().unwrap());

    assert_eq!(counts.len(), 10);
    for (level, count) in counts.iter().enumerate() {
        assert!(
            (49..=51).contains(count),
            "level {} covers {} rows, expected about 50",
            level + 1,
            count
        );
    }
    assert_eq!(counts.iter().sum::<usize>(), 500);
}

#[test]
fn test_same_seed_gives_identical_datasets() {
    let config = presets::clinical_mixed();
    let first = build_dataset(&config).unwrap();
    let second = build_dataset(&config).unwrap();
    assert_eq!(first.dataset, second.dataset);
    assert_eq!(first.assembly, second.assembly);
}

#[test]
fn test_different_seed_changes_dataset() {
    let mut config = presets::ordinal_weights();
    let first = build_dataset(&config).unwrap();
    config.seed = 124;
    let second = build_dataset(&config).unwrap();
    assert_ne!(first.dataset, second.dataset);
}

#[test]
fn test_reseed_changes_only_missing_pattern() {
    let mut config = presets::ordinal_weights();
    config.missingness.as_mut().unwrap().reseed = Some(1);
    let first = build_dataset(&config).unwrap();
    config.missingness.as_mut().unwrap().reseed = Some(2);
    let second = build_dataset(&config).unwrap();

    assert_eq!(first.dataset.outcome(), second.dataset.outcome());

    let mut any_pattern_differs = false;
    for (a, b) in first.dataset.predictors().iter().zip(second.dataset.predictors()) {
        let a_data = a.as_categorical().unwrap();
        let b_data = b.as_categorical().unwrap();
        for (x, y) in a_data.codes().iter().zip(b_data.codes()) {
            if let (Some(x), Some(y)) = (x, y) {
                assert_eq!(x, y, "observed values of {} must not change", a.name);
            }
        }
        if common::missing_rows(a) != common::missing_rows(b) {
            any_pattern_differs = true;
        }
        assert_eq!(a.missing_count(), 5);
        assert_eq!(b.missing_count(), 5);
    }
    assert!(any_pattern_differs);
}

#[test]
fn test_clinical_missing_before_outcome_drops_rows() {
    let built = build_dataset(&presets::clinical_mixed()).unwrap();
    let dataset = &built.dataset;

    // 10% missing in four informative columns propagates into the outcome
    assert!(built.assembly.rows_dropped() > 0);
    assert_eq!(dataset.n_rows(), built.assembly.rows_after);
    assert_eq!(dataset.outcome().unwrap().missing_count(), 0);
    assert_eq!(dataset.n_cols(), 9);

    for column in dataset.predictors() {
        assert_eq!(column.kind(), ColumnKind::Categorical);
        assert!(column.data.distinct_levels() <= 5, "{} has too many levels", column.name);
    }
    // rows kept all have an observed score, so informative columns are complete
    for name in ["age", "bmi", "sbp", "smoking"] {
        assert_eq!(dataset.column(name).unwrap().missing_count(), 0);
    }
}

#[test]
fn test_supervised_bins_are_small_and_keep_missing() {
    let built = build_dataset(&presets::supervised_bins()).unwrap();
    for name in ["x1", "x2", "x3"] {
        let column = built.dataset.column(name).unwrap();
        let levels = column.data.distinct_levels();
        assert!((2..=4).contains(&levels), "{} has {} levels", name, levels);
        assert_eq!(column.missing_count(), 40);
    }
}

#[test]
fn test_disjoint_missing_never_overlaps() {
    let built = build_dataset(&presets::disjoint_missing()).unwrap();
    let mut seen = std::collections::HashSet::new();
    for column in built.dataset.predictors() {
        let rows = common::missing_rows(column);
        assert_eq!(rows.len(), 50);
        for row in rows {
            assert!(seen.insert(row), "row {} is missing in two columns", row);
        }
    }
}

#[test]
fn test_run_scenario_ranks_strongest_predictor_first() {
    let mut config = presets::ordinal_weights();
    config.mining = MiningRequest {
        combination_size: Some(1),
        result_count: Some(3),
    };
    config.miner.bootstrap = 20;

    let (_, results) = run_scenario(&config, true).unwrap();
    let results = results.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].variables, vec!["V1".to_string()]);
    for result in &results {
        let name = &result.variables[0];
        assert!(
            ["V1", "V2", "V3", "V4", "V5"].contains(&name.as_str()),
            "uninformative {} ranked in the top 3",
            name
        );
    }
    assert!(results.windows(2).all(|w| w[0].estimate >= w[1].estimate));
}

#[test]
fn test_run_scenario_without_mining() {
    let (built, results) = run_scenario(&presets::disjoint_missing(), false).unwrap();
    assert!(results.is_none());
    assert_eq!(built.dataset.n_rows(), 600);
}

#[test]
fn test_run_export_flags_sparse_predictors() {
    let mut config = common::linear_quantile_config(200, 4);
    config.missingness = Some(MissingnessConfig {
        stage: MissingnessStage::AfterOutcome,
        amount: MissingAmount::Fraction(0.4),
        policy: MissingnessPolicy::Independent,
        columns: Vec::new(),
        include_outcome: false,
        reseed: None,
    });
    let built = build_dataset(&config).unwrap();

    assert_eq!(sparse_predictors(&built, "y").unwrap(), vec!["x".to_string()]);
    let export = build_run_export(&config, &built, None).unwrap();
    assert_eq!(export.dataset.sparse_predictors, vec!["x".to_string()]);

    // the unmodified configuration has nothing to flag
    let clean = build_dataset(&common::linear_quantile_config(200, 4)).unwrap();
    assert!(sparse_predictors(&clean, "y").unwrap().is_empty());
}
