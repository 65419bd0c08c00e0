//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `subdomain_recon` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Printing the final report as JSON on stdout
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use subdomain_recon::initialization::{init_logger_to_file, init_logger_with};
use subdomain_recon::{render, run_reconnaissance, Format, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let log_file = opt.log_file.clone();
    let config = opt.into_config()?;

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    match &log_file {
        Some(path) => init_logger_to_file(log_level.into(), log_format, path),
        None => init_logger_with(log_level.into(), log_format),
    }
    .context("Failed to initialize logger")?;

    let outcome = run_reconnaissance(config).await;

    if let Some(report) = &outcome.report {
        let json = render(report, Format::Json).context("Failed to render report")?;
        println!("{}", String::from_utf8_lossy(&json).trim_end());
    }

    if outcome.is_completed() {
        for file in &outcome.files {
            eprintln!("Report saved to {}", file.display());
        }
        Ok(())
    } else {
        eprintln!(
            "subdomain_recon error: {}",
            outcome.error.as_deref().unwrap_or("unknown failure")
        );
        process::exit(1);
    }
}
