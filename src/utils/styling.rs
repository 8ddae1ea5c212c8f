//! Terminal styling utilities for the scenario runner

use std::time::Duration;

use console::{style, Emoji};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static HOLE: Emoji<'_, '_> = Emoji("🕳️  ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ___ _  _ _ __ | |_| |__  _ __ ___ (_)_ __   ___
    / __| || | '_ \| __| '_ \| '_ ` _ \| | '_ \ / _ \
    \__ \ || | | | | |_| | | | | | | | | | | | |  __/
    |___/\_, |_| |_|\__|_| |_|_| |_| |_|_|_| |_|\___|
         |__/
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("κ").magenta().bold(),
        style("Synthetic data for association mining").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Facts shown in the configuration card
pub struct ConfigCard<'a> {
    pub scenario: &'a str,
    pub seed: u64,
    pub rows: usize,
    pub variables: usize,
    pub outcome: &'a str,
    pub missingness: String,
    pub output: Option<&'a str>,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!("    │ {:<width$}│", style("⚙️  Scenario").cyan().bold(), width = box_width - 2);
    println!("    ├{}┤", line);
    println!("    │  {}Name:      {:<38}│", DICE, truncate_string(card.scenario, 37));
    println!(
        "    │  {}Outcome:   {:<38}│",
        TARGET,
        truncate_string(card.outcome, 37)
    );
    println!(
        "    │  {}Missing:   {:<38}│",
        HOLE,
        truncate_string(&card.missingness, 37)
    );
    if let Some(output) = card.output {
        println!("    │  {}Output:    {:<38}│", SAVE, truncate_string(output, 37));
    }
    println!("    ├{}┤", line);
    println!(
        "    │  Seed: {:<12} Rows: {:<10} Variables: {:<6}│",
        style(card.seed).yellow(),
        style(card.rows).yellow(),
        style(card.variables).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!("      {}", style(format!("({:.2}s)", elapsed.as_secs_f64())).dim());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!("    {} {}", ROCKET, style("Scenario complete!").green().bold());
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().rev().take(max_len - 3).collect::<Vec<_>>().into_iter().rev().collect();
        format!("...{}", tail)
    }
}
