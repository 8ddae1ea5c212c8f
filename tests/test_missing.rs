//! Tests for missing value injection and analysis

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use synthmine::pipeline::{
    analyze_missing_values, get_features_above_threshold, inject_missing, inject_table, Column as SynthColumn,
    MissingAmount, MissingnessConfig, MissingnessPolicy, MissingnessStage, PipelineError, Table,
};

#[path = "common/mod.rs"]
mod common;

fn numbered(name: &str, n: usize) -> SynthColumn {
    SynthColumn::continuous(name, (0..n).map(|i| Some(i as f64)).collect())
}

fn config(amount: MissingAmount, policy: MissingnessPolicy) -> MissingnessConfig {
    MissingnessConfig {
        stage: MissingnessStage::AfterOutcome,
        amount,
        policy,
        columns: Vec::new(),
        include_outcome: false,
        reseed: None,
    }
}

#[test]
fn test_fraction_marks_rounded_count() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut column = numbered("x", 1000);
    let rows = inject_missing(&mut column, MissingAmount::Fraction(0.1), &mut rng).unwrap();
    assert_eq!(rows.len(), 100);
    assert_eq!(column.missing_count(), 100);
}

#[test]
fn test_other_cells_unchanged() {
    let mut rng = StdRng::seed_from_u64(2);
    let original = numbered("x", 200);
    let mut column = original.clone();
    let rows = inject_missing(&mut column, MissingAmount::Count(17), &mut rng).unwrap();

    let mut sorted = rows.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), 17, "rows are drawn without replacement");

    for i in 0..200 {
        if rows.contains(&i) {
            assert!(column.data.is_missing(i));
        } else {
            assert_eq!(column.data.numeric(i), original.data.numeric(i));
        }
    }
}

#[test]
fn test_count_above_rows_rejected() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut column = numbered("x", 10);
    assert!(matches!(
        inject_missing(&mut column, MissingAmount::Count(11), &mut rng),
        Err(PipelineError::TooManyMissing { .. })
    ));
    assert_eq!(column.missing_count(), 0);
}

#[test]
fn test_outcome_protected_by_default() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut table = Table::from_columns(vec![numbered("a", 50), numbered("b", 50), numbered("y", 50)]).unwrap();

    let chosen = inject_table(
        &mut table,
        &config(MissingAmount::Count(5), MissingnessPolicy::Independent),
        Some("y"),
        &mut rng,
    )
    .unwrap();

    assert_eq!(chosen.len(), 2);
    assert_eq!(table.get("a").unwrap().missing_count(), 5);
    assert_eq!(table.get("b").unwrap().missing_count(), 5);
    assert_eq!(table.get("y").unwrap().missing_count(), 0);
}

#[test]
fn test_outcome_requires_explicit_opt_in() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut table = Table::from_columns(vec![numbered("a", 20), numbered("y", 20)]).unwrap();
    let mut cfg = config(MissingAmount::Count(2), MissingnessPolicy::Independent);
    cfg.columns = vec!["y".to_string()];
    assert!(inject_table(&mut table, &cfg, Some("y"), &mut rng).is_err());

    cfg.include_outcome = true;
    inject_table(&mut table, &cfg, Some("y"), &mut rng).unwrap();
    assert_eq!(table.get("y").unwrap().missing_count(), 2);
    assert_eq!(table.get("a").unwrap().missing_count(), 0);
}

#[test]
fn test_disjoint_partition() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut table = Table::from_columns((0..4).map(|i| numbered(&format!("c{}", i), 40)).collect()).unwrap();

    let chosen = inject_table(
        &mut table,
        &config(MissingAmount::Count(10), MissingnessPolicy::Disjoint),
        None,
        &mut rng,
    )
    .unwrap();

    let mut all: Vec<usize> = chosen.iter().flat_map(|(_, rows)| rows.clone()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..40).collect::<Vec<_>>());
}

#[test]
fn test_disjoint_rejects_oversubscription() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut table = Table::from_columns((0..3).map(|i| numbered(&format!("c{}", i), 20)).collect()).unwrap();
    let result = inject_table(
        &mut table,
        &config(MissingAmount::Count(8), MissingnessPolicy::Disjoint),
        None,
        &mut rng,
    );
    assert!(matches!(result, Err(PipelineError::TooManyMissing { requested: 24, .. })));
}

#[test]
fn test_reseed_ignores_caller_generator() {
    let build = || Table::from_columns(vec![numbered("a", 100)]).unwrap();
    let mut cfg = config(MissingAmount::Count(10), MissingnessPolicy::Independent);
    cfg.reseed = Some(77);

    let mut first = build();
    let mut second = build();
    inject_table(&mut first, &cfg, None, &mut StdRng::seed_from_u64(1)).unwrap();
    inject_table(&mut second, &cfg, None, &mut StdRng::seed_from_u64(2)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_analyze_missing_values_basic() {
    let df = df! {
        "col_complete" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
        "col_partial_missing" => [Some(1.0f64), Some(2.0), None, None, Some(5.0)],
        "col_all_missing" => [None::<f64>, None, None, None, None],
    }
    .unwrap();

    let ratios = analyze_missing_values(&df);
    let ratio_map: std::collections::HashMap<_, _> = ratios.iter().cloned().collect();

    assert!((ratio_map["col_complete"] - 0.0).abs() < 0.001);
    assert!((ratio_map["col_partial_missing"] - 0.4).abs() < 0.001);
    assert!((ratio_map["col_all_missing"] - 1.0).abs() < 0.001);
    // sorted descending
    assert_eq!(ratios[0].0, "col_all_missing");
}

#[test]
fn test_features_above_threshold_skip_outcome() {
    let ratios = vec![
        ("a".to_string(), 0.5),
        ("y".to_string(), 0.9),
        ("b".to_string(), 0.1),
    ];
    let above = get_features_above_threshold(&ratios, 0.3, "y");
    assert_eq!(above, vec!["a".to_string()]);
}

#[test]
fn test_analyze_missing_values_empty_dataframe() {
    let df = DataFrame::empty();
    assert!(analyze_missing_values(&df).is_empty());
}
