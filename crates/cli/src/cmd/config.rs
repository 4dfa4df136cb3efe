//! Configuration inspection commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use reflow_core::config;
use std::path::Path;

/// Print the commented example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Load and validate a config file
pub async fn run_check(path: &Path) -> Result<()> {
    let loaded = config::load_from(path).context("Invalid configuration")?;
    println!(
        "{} {} (tick {}ms, cooldown {}s)",
        "✓".green(),
        path.display(),
        loaded.scheduler.tick_interval_ms,
        loaded.scheduler.cooldown_secs
    );
    Ok(())
}

/// Print the resolved default config location
pub async fn run_path() -> Result<()> {
    let path = config::config_file_path().context("Could not determine config file path")?;
    println!("{}", path.display());
    if !path.exists() {
        println!("{}", "File does not exist; defaults are in effect.".yellow());
    }
    Ok(())
}
