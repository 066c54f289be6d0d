//! dumpsys - Dump the diagnostic state of running services
//!
//! Enumerates the services registered in a socket directory, asks each one
//! for a diagnostic dump under a per-service timeout and prints the results.
//! Stdout carries only dump output; logs and per-service errors go to stderr.

mod cli;
mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use dumpsys_core::Report;
use dumpsys_engine::{Dumpsys, Renderer};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;

/// Exit status when the registry needed by the requested mode is unreachable
const EXIT_REGISTRY_UNAVAILABLE: u8 = 20;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("dumpsys: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("DUMPSYS_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Load config file
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|err| {
            warn!(error = %err, "Ignoring default config file");
            Config::default()
        }),
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(
        cli.timeout,
        cli.services_dir.as_deref(),
        cli.hardware_dir.as_deref(),
    )?;
    debug!(?merged, "Resolved configuration");

    let (services, hardware) = dumpsys_socket::registries(&merged.registry_config());
    let dumpsys = Dumpsys::new(services, hardware).with_options(merged.dump_options());

    let report = match dumpsys.run(&cli.target()).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("dumpsys: {}", err);
            return Ok(ExitCode::from(EXIT_REGISTRY_UNAVAILABLE));
        }
    };

    render(&report)?;
    Ok(ExitCode::SUCCESS)
}

fn render(report: &Report) -> Result<()> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    Renderer::new(stdout.lock(), stderr.lock())
        .render(report)
        .context("Failed to write report")
}
