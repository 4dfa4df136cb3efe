//! Replay a scripted host session through the scheduler

use crate::harness;
use crate::script;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use reflow_core::config;
use std::path::Path;
use std::time::Instant;

pub async fn run(script_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    let script = script::load(script_path)
        .with_context(|| format!("Could not load script {}", script_path.display()))?;

    let started = Instant::now();
    let report = harness::replay(config, script).await?;
    let elapsed = started.elapsed();

    println!(
        "{} {}",
        "Replay finished in".bold(),
        format!("{:.1}s", elapsed.as_secs_f64()).dimmed()
    );

    if !report.enabled {
        println!(
            "{}",
            "Scheduler disabled: no reformat command available".yellow()
        );
        return Ok(());
    }

    println!("  passes: {}", report.stats.passes_completed);
    println!("  reformatted: {}", report.stats.documents_reformatted);
    println!("  failures: {}", report.stats.command_failures);
    println!(
        "  discarded by build: {}",
        report.stats.saves_discarded_by_build
    );

    if !report.invocations.is_empty() {
        println!("\n{}", "Invocations".bold());
        for (index, doc) in report.invocations.iter().enumerate() {
            println!("  {}. {}", index + 1, doc.path().cyan());
        }
    }

    Ok(())
}
