//! Terminal summaries of a scenario run

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{CombinationResult, Dataset};
use crate::scenario::BuiltDataset;

/// Per-column facts about an assembled dataset
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub levels: usize,
    pub missing: usize,
    pub is_outcome: bool,
}

/// Overview of the assembled dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows_generated: usize,
    pub rows: usize,
    pub columns: Vec<ColumnStats>,
    pub warnings: Vec<String>,
}

impl DatasetSummary {
    pub fn from_built(built: &BuiltDataset) -> Self {
        let dataset: &Dataset = &built.dataset;
        let outcome = dataset.outcome().map(|c| c.name.as_str());
        let columns = dataset
            .columns()
            .iter()
            .map(|c| ColumnStats {
                name: c.name.clone(),
                levels: c.data.distinct_levels(),
                missing: c.missing_count(),
                is_outcome: Some(c.name.as_str()) == outcome,
            })
            .collect();

        Self {
            rows_generated: built.assembly.rows_before,
            rows: built.assembly.rows_after,
            columns,
            warnings: built.assembly.warnings.clone(),
        }
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("DATASET SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Column").add_attribute(Attribute::Bold),
            Cell::new("Levels").add_attribute(Attribute::Bold),
            Cell::new("Missing").add_attribute(Attribute::Bold),
            Cell::new("Missing %").add_attribute(Attribute::Bold),
        ]);

        for column in &self.columns {
            let pct = if self.rows > 0 {
                column.missing as f64 / self.rows as f64 * 100.0
            } else {
                0.0
            };
            let name = if column.is_outcome {
                Cell::new(format!("{} (outcome)", column.name))
                    .fg(Color::Cyan)
                    .add_attribute(Attribute::Bold)
            } else {
                Cell::new(&column.name)
            };
            table.add_row(vec![
                name,
                Cell::new(column.levels).set_alignment(CellAlignment::Right),
                Cell::new(column.missing)
                    .set_alignment(CellAlignment::Right)
                    .fg(if column.missing == 0 { Color::White } else { Color::Yellow }),
                Cell::new(format!("{:.1}%", pct)).set_alignment(CellAlignment::Right),
            ]);
        }

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!(
            "      Rows: {} generated, {} kept ({} dropped for missing outcome)",
            self.rows_generated,
            style(self.rows).green().bold(),
            self.rows_generated - self.rows
        );
    }
}

/// Print ranked combinations as a table; `confidence` labels the interval column
pub fn display_results(results: &[CombinationResult], confidence: f64) {
    println!();
    println!(
        "    {} {}",
        style("🏆").cyan(),
        style("TOP COMBINATIONS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    if results.is_empty() {
        println!("      {}", style("No combinations were returned").dim());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Variables").add_attribute(Attribute::Bold),
        Cell::new("Estimate").add_attribute(Attribute::Bold),
        Cell::new(interval_header(confidence)).add_attribute(Attribute::Bold),
        Cell::new("z").add_attribute(Attribute::Bold),
        Cell::new("p-value").add_attribute(Attribute::Bold),
    ]);

    for (rank, result) in results.iter().enumerate() {
        let (lo, hi) = result.confidence_interval;
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(result.variables.join(" + ")),
            Cell::new(format!("{:.4}", result.estimate))
                .fg(if rank == 0 { Color::Green } else { Color::White })
                .add_attribute(Attribute::Bold),
            Cell::new(format_interval(lo, hi)),
            Cell::new(format!("{:.2}", result.z_score)).set_alignment(CellAlignment::Right),
            Cell::new(format_p_value(result.p_value)).set_alignment(CellAlignment::Right),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn interval_header(confidence: f64) -> String {
    // one decimal place at most: 0.95 -> "95", 0.975 -> "97.5"
    format!("{}% CI", (confidence * 1000.0).round() / 10.0)
}

fn format_interval(lo: f64, hi: f64) -> String {
    if lo.is_nan() || hi.is_nan() {
        "-".to_string()
    } else {
        format!("[{:.4}, {:.4}]", lo, hi)
    }
}

fn format_p_value(p: f64) -> String {
    if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}
