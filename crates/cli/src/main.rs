//! Reflow CLI - replay harness for the format-on-save scheduler

use anyhow::Result;
use clap::{Parser, Subcommand};
use reflow_cli::cmd;
use std::path::PathBuf;

/// Reflow - debounced format-on-save orchestration
#[derive(Parser)]
#[command(name = "reflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted host session through the scheduler
    Replay {
        /// Path to the JSON event script
        script: PathBuf,

        /// Use this config file instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Inspect configuration
    Config {
        /// Print the commented example configuration
        #[arg(long)]
        example: bool,

        /// Load and validate a config file
        #[arg(long)]
        check: Option<PathBuf>,

        /// Print the resolved default config location
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { script, config } => {
            cmd::replay::run(&script, config.as_deref()).await
        }
        Commands::Config {
            example,
            check,
            path,
        } => {
            if example {
                cmd::config::run_example().await
            } else if let Some(check) = check {
                cmd::config::run_check(&check).await
            } else if path {
                cmd::config::run_path().await
            } else {
                anyhow::bail!("Use one of --example, --check <path>, or --path");
            }
        }
    }
}
