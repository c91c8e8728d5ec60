//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `brc_analytics` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use brc_analytics::config::{Cli, Command};
use brc_analytics::initialization::init_logger_with;
use brc_analytics::{
    run_analyze, run_clean, run_organisms, run_snapshot, run_summary, run_workflows,
    RefreshOutcome, ReportOutcome,
};

fn print_outcome(outcome: &ReportOutcome) {
    match &outcome.text_path {
        Some(path) => println!("Report saved to {}", path.display()),
        None => println!("No matching pages found; no report written"),
    }
    if let Some(path) = &outcome.html_path {
        println!("HTML report saved to {}", path.display());
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let lookup = cli.lookup.to_config();

    match cli.command {
        Command::Organisms(args) => {
            print_outcome(&run_organisms(&args.into_config(lookup)).await?);
        }
        Command::Workflows(args) => {
            print_outcome(&run_workflows(&args.into_config(lookup)).await?);
        }
        Command::Analyze(args) => {
            let report = run_analyze(&args.into_config(lookup)).await?;
            print_outcome(&report.organisms);
            print_outcome(&report.workflows);
        }
        Command::Summary(args) => {
            let outcome = run_summary(&args.into_config(&lookup)).await?;
            if let Some(path) = &outcome.output {
                println!(
                    "Summary of {} month{} saved to {}",
                    outcome.months.len(),
                    if outcome.months.len() == 1 { "" } else { "s" },
                    path.display()
                );
            }
        }
        Command::Taxonomy(args) => match run_snapshot(&args.into_config(lookup)).await? {
            RefreshOutcome::Created { path, .. } => {
                println!("Taxonomy snapshot saved to {}", path.display())
            }
            RefreshOutcome::UpToDate { .. } => println!("Taxonomy snapshot is up to date"),
        },
        Command::Clean(args) => {
            let report = run_clean(&args.input, args.output.as_deref())?;
            println!(
                "Cleaned {} row{} ({} dropped) into {}",
                report.rows,
                if report.rows == 1 { "" } else { "s" },
                report.dropped,
                report.output.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting NCBI_API_KEY in .env without exporting it manually
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let log_level = cli.log_level.clone();
    let log_format = cli.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Err(e) = dispatch(cli).await {
        eprintln!("brc_analytics error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
