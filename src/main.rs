//! synthmine: scenario runner CLI
//!
//! Builds a named (or file-defined) synthetic dataset, optionally exports
//! it, and prints the top predictor combinations for its outcome.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Table};
use console::style;

use synthmine::cli::{Cli, Commands, RunArgs};
use synthmine::pipeline::{MissingAmount, MissingnessConfig, MissingnessPolicy, MissingnessStage, PipelineError};
use synthmine::report::{
    display_results, export_run, save_dataset, sparse_predictors, DatasetSummary, SPARSE_PREDICTOR_RATIO,
};
use synthmine::scenario::{build_dataset, mine_dataset, presets, ScenarioConfig};
use synthmine::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success, print_warning, ConfigCard,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => list_scenarios(),
        Commands::Show { name } => show_scenario(&name),
        Commands::Run(args) => run(&args),
    }
}

fn lookup(name: &str) -> Result<ScenarioConfig> {
    presets::find(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown scenario '{}'. Available scenarios: {}",
            name,
            presets::PRESET_NAMES.join(", ")
        )
    })
}

fn list_scenarios() -> Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Scenario").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new("Description").add_attribute(Attribute::Bold),
    ]);
    for config in presets::all() {
        table.add_row(vec![
            Cell::new(&config.name),
            Cell::new(config.rows),
            Cell::new(&config.description),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn show_scenario(name: &str) -> Result<()> {
    let config = lookup(name)?;
    println!("{}", config.to_json()?);
    Ok(())
}

fn describe_missingness(missing: Option<&MissingnessConfig>) -> String {
    let Some(missing) = missing else {
        return "none".to_string();
    };
    let amount = match missing.amount {
        MissingAmount::Fraction(p) => format!("{:.1}%", p * 100.0),
        MissingAmount::Count(k) => format!("{} cells", k),
    };
    let policy = match missing.policy {
        MissingnessPolicy::Independent => "independent",
        MissingnessPolicy::Disjoint => "disjoint",
    };
    let stage = match missing.stage {
        MissingnessStage::BeforeOutcome => "before outcome",
        MissingnessStage::AfterOutcome => "after outcome",
    };
    let mut text = format!("{} {}, {}", amount, policy, stage);
    if let Some(seed) = missing.reseed {
        text.push_str(&format!(", reseed {}", seed));
    }
    text
}

/// Headline for a failed build, by the kind of pipeline error underneath
fn failure_label(err: &anyhow::Error) -> &'static str {
    match err.chain().find_map(|e| e.downcast_ref::<PipelineError>()) {
        Some(e) if e.is_configuration() => "Scenario configuration rejected",
        Some(_) => "Dataset failed a pipeline check",
        None => "Dataset build failed",
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let mut config = match (&args.config, &args.name) {
        (Some(path), _) => ScenarioConfig::from_json_file(path)?,
        (None, Some(name)) => lookup(name)?,
        (None, None) => anyhow::bail!("Either a scenario name or --config is required"),
    };
    args.overrides()
        .apply(&mut config)
        .context("Invalid scenario overrides")?;

    print_banner(env!("CARGO_PKG_VERSION"));
    let output = args.output.as_ref().map(|p| p.display().to_string());
    print_config(&ConfigCard {
        scenario: &config.name,
        seed: config.seed,
        rows: config.rows,
        variables: config.variables.len(),
        outcome: &config.outcome.name,
        missingness: describe_missingness(config.missingness.as_ref()),
        output: output.as_deref(),
    });

    // Step 1: generate, degrade, discretize and assemble
    let mut step = 1;
    print_step_header(step, "Build Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Generating variables and outcome...");
    let built = match build_dataset(&config) {
        Ok(built) => built,
        Err(err) => {
            let label = failure_label(&err);
            finish_with_warning(&spinner, label);
            return Err(err.context(label));
        }
    };
    if built.assembly.warnings.is_empty() {
        finish_with_success(&spinner, "Dataset assembled");
    } else {
        finish_with_warning(&spinner, "Dataset assembled with warnings");
        for warning in &built.assembly.warnings {
            print_warning(warning);
        }
    }

    let injected: usize = built.injected.iter().map(|(_, k)| k).sum();
    if injected > 0 {
        print_count(
            "cell(s) blanked",
            injected,
            Some(&format!("(across {} column(s))", built.injected.len())),
        );
    }
    if built.assembly.rows_dropped() > 0 {
        print_info(&format!(
            "Dropped {} row(s) with a missing outcome",
            built.assembly.rows_dropped()
        ));
    }
    for name in sparse_predictors(&built, &config.outcome.name)? {
        print_warning(&format!(
            "Predictor '{}' is more than {:.0}% missing",
            name,
            SPARSE_PREDICTOR_RATIO * 100.0
        ));
    }
    let summary = DatasetSummary::from_built(&built);
    summary.display();
    print_step_time(step_start.elapsed());

    // Step 2: optional dataset export
    if let Some(path) = &args.output {
        step += 1;
        print_step_header(step, "Save Dataset");
        let step_start = Instant::now();
        let spinner = create_spinner("Writing output file...");
        let mut df = built
            .dataset
            .to_dataframe()
            .context("Failed to convert dataset for export")?;
        save_dataset(&mut df, path)?;
        finish_with_success(&spinner, &format!("Saved to {}", path.display()));
        print_step_time(step_start.elapsed());
    }

    // Step 3: mining
    let results = if args.no_mine {
        print_info("Mining skipped (--no-mine)");
        None
    } else {
        step += 1;
        print_step_header(step, "Mine Combinations");
        let step_start = Instant::now();
        let results = mine_dataset(&built.dataset, &config)?;
        print_success(&format!("Ranked {} combination(s)", results.len()));
        display_results(&results, config.miner.confidence);
        print_step_time(step_start.elapsed());
        Some(results)
    };

    if let Some(path) = &args.export_json {
        export_run(&config, &built, results.as_deref(), path)?;
        print_success(&format!("Run report written to {}", path.display()));
    }

    println!(
        "\n    {} {} rows x {} columns, {} missing predictor cell(s)",
        style("✧").cyan(),
        built.dataset.n_rows(),
        built.dataset.n_cols(),
        summary.total_missing()
    );
    print_completion();
    Ok(())
}
