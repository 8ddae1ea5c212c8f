//! Tests for fixed and supervised discretization

use synthmine::pipeline::{
    bin_supervised, check_autobin_input, discretize, AutoBinConfig, AutoBinner, CartBinner, CategoricalData, Column,
    CutPoints, PipelineError, Result, Table,
};

#[path = "common/mod.rs"]
mod common;

fn age_cuts(include_lowest: bool) -> CutPoints {
    CutPoints::new(vec![18.0, 40.0, 60.0, 90.0], &["young", "middle", "old"], include_lowest).unwrap()
}

fn labels_of(column: &Column) -> Vec<Option<String>> {
    column
        .as_categorical()
        .unwrap()
        .labels()
        .map(|l| l.map(str::to_string))
        .collect()
}

#[test]
fn test_boundary_value_goes_to_lower_interval() {
    let column = Column::continuous("age", vec![Some(40.0), Some(40.5), Some(60.0), Some(90.0)]);
    let binned = discretize(&column, &age_cuts(true)).unwrap();
    assert_eq!(
        labels_of(&binned),
        vec![
            Some("young".to_string()),
            Some("middle".to_string()),
            Some("middle".to_string()),
            Some("old".to_string())
        ]
    );
}

#[test]
fn test_lowest_boundary_needs_flag() {
    let column = Column::continuous("age", vec![Some(18.0)]);
    let with = discretize(&column, &age_cuts(true)).unwrap();
    let without = discretize(&column, &age_cuts(false)).unwrap();
    assert_eq!(labels_of(&with), vec![Some("young".to_string())]);
    assert_eq!(labels_of(&without), vec![None]);
}

#[test]
fn test_out_of_range_and_missing_map_to_missing() {
    let column = Column::continuous("age", vec![Some(10.0), None, Some(95.0), Some(30.0)]);
    let binned = discretize(&column, &age_cuts(true)).unwrap();
    assert_eq!(binned.missing_count(), 3);
    assert_eq!(binned.as_categorical().unwrap().levels().len(), 3);
}

#[test]
fn test_discretize_is_idempotent() {
    let column = Column::count("visits", vec![Some(20), Some(45), Some(70)]);
    let once = discretize(&column, &age_cuts(true)).unwrap();
    let twice = discretize(&once, &age_cuts(true)).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_invalid_cut_points() {
    assert!(matches!(
        CutPoints::new(vec![1.0, 1.0, 2.0], &["a", "b"], true),
        Err(PipelineError::InvalidBreaks(_))
    ));
    assert!(matches!(
        CutPoints::new(vec![0.0, 1.0, 2.0], &["a"], true),
        Err(PipelineError::InvalidBreaks(_))
    ));
    let six = ["a", "b", "c", "d", "e", "f"];
    assert!(CutPoints::new((0..7).map(f64::from).collect(), &six, true).is_err());
}

/// Binner that reports what it was given
struct ShapeBinner;

impl AutoBinner for ShapeBinner {
    fn auto_bin(&self, table: &Table, predictor_index: usize) -> Result<CategoricalData> {
        check_autobin_input(table, predictor_index)?;
        CategoricalData::new(vec!["all".to_string()], vec![Some(0); table.n_rows()])
    }
}

#[test]
fn test_supervised_uses_only_observed_outcome_rows() {
    let predictor = Column::continuous("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
    let outcome = common::categorical("y", 2, vec![Some(0), None, Some(1), Some(1)]);

    let binned = bin_supervised(&ShapeBinner, &predictor, &outcome).unwrap();
    assert_eq!(binned.len(), 4);
    assert!(binned.data.is_missing(1));
    assert_eq!(binned.missing_count(), 1);
}

#[test]
fn test_autobin_input_shape_checked() {
    let table = Table::from_columns(vec![
        common::categorical("y", 2, vec![Some(0), Some(1)]),
        Column::continuous("x", vec![Some(1.0), Some(2.0)]),
    ])
    .unwrap();
    assert!(matches!(
        check_autobin_input(&table, 0),
        Err(PipelineError::PreconditionFailed(_))
    ));
    assert!(check_autobin_input(&table, 1).is_err());
}

#[test]
fn test_cart_binner_separates_classes() {
    let n = 200;
    let predictor = Column::continuous("x", (0..n).map(|i| Some(i as f64)).collect());
    let outcome = common::categorical("y", 2, (0..n).map(|i| Some(u32::from(i >= 120))).collect());

    let binner = CartBinner::new(AutoBinConfig {
        max_bins: 2,
        min_bin_pct: 5.0,
    })
    .unwrap();
    let binned = bin_supervised(&binner, &predictor, &outcome).unwrap();
    let data = binned.as_categorical().unwrap();

    assert_eq!(data.levels(), &["[0,119]".to_string(), "(119,199]".to_string()]);
    assert_eq!(data.codes()[119], Some(0));
    assert_eq!(data.codes()[120], Some(1));
}

#[test]
fn test_cart_binner_keeps_missing_predictor_values() {
    let predictor = Column::continuous(
        "x",
        (0..60).map(|i| if i % 10 == 0 { None } else { Some(i as f64) }).collect(),
    );
    let outcome = common::categorical("y", 2, (0..60).map(|i| Some(u32::from(i >= 30))).collect());
    let binned = bin_supervised(&CartBinner::default(), &predictor, &outcome).unwrap();
    assert_eq!(binned.missing_count(), 6);
}

#[test]
fn test_cart_binner_splits_off_zero_counts() {
    let predictor = Column::count(
        "comorbidities",
        (0..200).map(|i| Some(if i < 80 { 0 } else { i % 4 + 1 })).collect(),
    );
    let outcome = common::categorical("y", 2, (0..200).map(|i| Some(u32::from(i >= 80))).collect());

    let binner = CartBinner::new(AutoBinConfig {
        max_bins: 4,
        min_bin_pct: 5.0,
    })
    .unwrap();
    let binned = bin_supervised(&binner, &predictor, &outcome).unwrap();
    let data = binned.as_categorical().unwrap();

    assert_eq!(data.levels(), &["[0,0]".to_string(), "(0,4]".to_string()]);
    assert_eq!(data.observed_levels(), 2);
    assert!(data.codes()[..80].iter().all(|&c| c == Some(0)));
    assert!(data.codes()[80..].iter().all(|&c| c == Some(1)));
}
