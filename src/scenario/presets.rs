//! Built-in scenarios
//!
//! Each preset is a complete [`ScenarioConfig`]; `synthmine show <name>`
//! prints it as JSON so it can be edited and fed back with `--config`.

use super::config::{BinRule, ScenarioConfig};
use crate::pipeline::{
    AssemblyOptions, AutoBinConfig, BinSpec, CutPoints, MinerConfig, MiningRequest, MissingAmount,
    MissingnessConfig, MissingnessPolicy, MissingnessStage, NoiseSpec, OutcomeBinning, OutcomeSpec, OutcomeTerm,
    VariableSpec,
};

/// Preset names in display order
pub const PRESET_NAMES: [&str; 4] = ["ordinal-weights", "clinical-mixed", "supervised-bins", "disjoint-missing"];

pub fn all() -> Vec<ScenarioConfig> {
    vec![ordinal_weights(), clinical_mixed(), supervised_bins(), disjoint_missing()]
}

pub fn find(name: &str) -> Option<ScenarioConfig> {
    all().into_iter().find(|c| c.name == name)
}

const GRADES: [&str; 4] = ["A", "B", "C", "D"];
const TIERS: [&str; 3] = ["low", "mid", "high"];

/// Ten categorical predictors; the first five drive a ten-level outcome
/// through fixed ordinal weights. Five cells per predictor go missing after
/// the outcome exists.
pub fn ordinal_weights() -> ScenarioConfig {
    let variables = (1..=10)
        .map(|i| {
            let name = format!("V{}", i);
            if i % 2 == 1 {
                VariableSpec::categorical(name, &GRADES, &[0.25, 0.25, 0.25, 0.25])
            } else {
                VariableSpec::categorical(name, &TIERS, &[0.3, 0.4, 0.3])
            }
        })
        .collect();

    let weights = [3.0, 2.0, 1.0, 0.5, -2.0];
    let terms = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let order: &[&str] = if i % 2 == 0 { &GRADES } else { &TIERS };
            OutcomeTerm::ordinal(format!("V{}", i + 1), w, order)
        })
        .collect();

    ScenarioConfig {
        name: "ordinal-weights".to_string(),
        description: "10 categorical predictors, weights 3/2/1/0.5/-2 on V1-V5, equal-frequency deciles".to_string(),
        seed: 123,
        rows: 1000,
        variables,
        outcome: OutcomeSpec {
            name: "Y".to_string(),
            terms,
            intercept: 0.0,
            noise: NoiseSpec::default(),
            binning: OutcomeBinning::EqualFrequency { k: 10 },
        },
        missingness: Some(MissingnessConfig {
            stage: MissingnessStage::AfterOutcome,
            amount: MissingAmount::Count(5),
            policy: MissingnessPolicy::Independent,
            columns: Vec::new(),
            include_outcome: false,
            reseed: None,
        }),
        bins: Vec::new(),
        assembly: AssemblyOptions::default(),
        mining: MiningRequest::default(),
        miner: MinerConfig {
            seed: 123,
            ..MinerConfig::default()
        },
    }
}

/// Lowest-inclusive cut-points; checked when the rule is applied
fn fixed(column: &str, breaks: &[f64], labels: &[&str]) -> BinRule {
    let cuts = CutPoints {
        breaks: breaks.to_vec(),
        labels: labels.iter().map(|s| s.to_string()).collect(),
        include_lowest: true,
    };
    BinRule::new(column, BinSpec::Fixed(cuts))
}

/// Clinical-style mixed types binned at conventional cut-points; missing
/// predictors propagate into a quintile outcome.
pub fn clinical_mixed() -> ScenarioConfig {
    let variables = vec![
        VariableSpec::normal("age", 55.0, 12.0).with_clamp(18.0, 90.0).with_digits(0),
        VariableSpec::log_normal("bmi", 27f64.ln(), 0.15).with_clamp(15.0, 50.0).with_digits(1),
        VariableSpec::normal("sbp", 130.0, 15.0).with_clamp(90.0, 200.0).with_digits(0),
        VariableSpec::categorical("smoking", &["never", "former", "current"], &[0.5, 0.3, 0.2]),
        VariableSpec::poisson("comorbidities", 1.2).with_clamp(0.0, 6.0),
        VariableSpec::binomial("sex", 1, 0.5),
        VariableSpec::uniform("noise_u", 0.0, 100.0).with_digits(1),
        VariableSpec::normal("noise_n", 0.0, 1.0).with_clamp(-4.0, 4.0).with_digits(2),
    ];

    let bins = vec![
        fixed("age", &[18.0, 40.0, 60.0, 75.0, 90.0], &["18-40", "41-60", "61-75", "76-90"]),
        fixed(
            "bmi",
            &[15.0, 18.5, 25.0, 30.0, 50.0],
            &["underweight", "normal", "overweight", "obese"],
        ),
        fixed(
            "sbp",
            &[90.0, 120.0, 140.0, 160.0, 200.0],
            &["normal", "elevated", "stage1", "stage2"],
        ),
        fixed("comorbidities", &[0.0, 1.0, 3.0, 6.0], &["0-1", "2-3", "4-6"]),
        fixed("sex", &[-1.0, 0.0, 1.0], &["female", "male"]),
        fixed("noise_u", &[0.0, 25.0, 50.0, 75.0, 100.0], &["q1", "q2", "q3", "q4"]),
        fixed("noise_n", &[-4.0, -1.0, 0.0, 1.0, 4.0], &["q1", "q2", "q3", "q4"]),
    ];

    ScenarioConfig {
        name: "clinical-mixed".to_string(),
        description: "Normal/log-normal/Poisson/binomial covariates, clinical cut-points, 10% missing before outcome"
            .to_string(),
        seed: 2024,
        rows: 1000,
        variables,
        outcome: OutcomeSpec {
            name: "risk".to_string(),
            terms: vec![
                OutcomeTerm::numeric("age", 0.05),
                OutcomeTerm::numeric("bmi", 0.1),
                OutcomeTerm::numeric("sbp", 0.02),
                OutcomeTerm::ordinal("smoking", 0.8, &["never", "former", "current"]),
                OutcomeTerm::numeric("comorbidities", 0.5),
            ],
            intercept: 0.0,
            noise: NoiseSpec { mean: 0.0, sd: 1.0 },
            binning: OutcomeBinning::Quantile { k: 5 },
        },
        missingness: Some(MissingnessConfig {
            stage: MissingnessStage::BeforeOutcome,
            amount: MissingAmount::Fraction(0.1),
            policy: MissingnessPolicy::Independent,
            columns: vec!["age".into(), "bmi".into(), "sbp".into(), "smoking".into()],
            include_outcome: false,
            reseed: None,
        }),
        bins,
        assembly: AssemblyOptions::default(),
        mining: MiningRequest {
            combination_size: Some(2),
            result_count: Some(5),
        },
        miner: MinerConfig {
            seed: 2024,
            ..MinerConfig::default()
        },
    }
}

/// Continuous predictors binned by CART against the outcome; missingness
/// uses its own seed.
pub fn supervised_bins() -> ScenarioConfig {
    let variables = vec![
        VariableSpec::normal("x1", 0.0, 1.0).with_digits(2),
        VariableSpec::normal("x2", 0.0, 1.0).with_digits(2),
        VariableSpec::uniform("x3", 0.0, 10.0).with_digits(1),
        VariableSpec::categorical("group", &TIERS, &[0.2, 0.5, 0.3]),
    ];

    let bins = ["x1", "x2", "x3"]
        .iter()
        .map(|&c| BinRule::new(c, BinSpec::Supervised(AutoBinConfig::default())))
        .collect();

    ScenarioConfig {
        name: "supervised-bins".to_string(),
        description: "Continuous predictors binned by CART splits on the outcome, reseeded missingness".to_string(),
        seed: 7,
        rows: 800,
        variables,
        outcome: OutcomeSpec {
            name: "class".to_string(),
            terms: vec![
                OutcomeTerm::numeric("x1", 1.5),
                OutcomeTerm::numeric("x2", -1.0),
                OutcomeTerm::ordinal("group", 0.7, &TIERS),
            ],
            intercept: 0.0,
            noise: NoiseSpec { mean: 0.0, sd: 0.5 },
            binning: OutcomeBinning::EqualFrequency { k: 3 },
        },
        missingness: Some(MissingnessConfig {
            stage: MissingnessStage::AfterOutcome,
            amount: MissingAmount::Fraction(0.05),
            policy: MissingnessPolicy::Independent,
            columns: Vec::new(),
            include_outcome: false,
            reseed: Some(99),
        }),
        bins,
        assembly: AssemblyOptions::default(),
        mining: MiningRequest::default(),
        miner: MinerConfig {
            seed: 7,
            ..MinerConfig::default()
        },
    }
}

/// Non-overlapping missing cells: no row loses more than one predictor
pub fn disjoint_missing() -> ScenarioConfig {
    let variables = (1..=6)
        .map(|i| VariableSpec::categorical(format!("C{}", i), &TIERS, &[1.0, 1.0, 1.0]))
        .collect();

    ScenarioConfig {
        name: "disjoint-missing".to_string(),
        description: "6 categorical predictors, 50 missing cells each from one shuffled partition".to_string(),
        seed: 11,
        rows: 600,
        variables,
        outcome: OutcomeSpec {
            name: "Y".to_string(),
            terms: vec![
                OutcomeTerm::ordinal("C1", 2.0, &TIERS),
                OutcomeTerm::ordinal("C2", -1.0, &TIERS),
            ],
            intercept: 0.0,
            noise: NoiseSpec::default(),
            binning: OutcomeBinning::EqualWidth { k: 5 },
        },
        missingness: Some(MissingnessConfig {
            stage: MissingnessStage::AfterOutcome,
            amount: MissingAmount::Count(50),
            policy: MissingnessPolicy::Disjoint,
            columns: Vec::new(),
            include_outcome: false,
            reseed: None,
        }),
        bins: Vec::new(),
        assembly: AssemblyOptions::default(),
        mining: MiningRequest {
            combination_size: Some(1),
            result_count: Some(3),
        },
        miner: MinerConfig {
            seed: 11,
            ..MinerConfig::default()
        },
    }
}
