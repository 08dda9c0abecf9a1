//! ---
//! eco_section: "05-networking-external-interfaces"
//! eco_subsection: "binary"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Control CLI for EcoSphere telemetry, forecasts, insights and reports."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ecosphere_common::AppConfig;
use ecosphere_logging as logging;

mod insights;
mod serve;
mod telemetry;

/// Lookup order when `--config` is not given.
const CONFIG_CANDIDATES: [&str; 2] = ["ecosphere.toml", "config/ecosphere.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "EcoSphere building telemetry and optimisation utility",
    long_about = None
)]
struct Cli {
    /// Configuration file (TOML). Takes precedence over `ECOSPHERE_CONFIG`.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a synthetic telemetry window
    Generate(telemetry::GenerateArgs),
    /// Extrapolate baseline and optimised forecasts
    Forecast(telemetry::ForecastArgs),
    /// Request optimisation recommendations
    Insights(insights::InsightsArgs),
    /// Export a markdown sustainability report
    Report(insights::ReportArgs),
    /// Serve the dashboard over HTTP
    Serve(serve::ServeArgs),
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_path(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(AppConfig::load_or_default(&CONFIG_CANDIDATES)?.config),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    if !matches!(cli.command, Commands::Serve(_)) {
        logging::init();
    }
    match cli.command {
        Commands::Generate(args) => telemetry::generate(args, &config)?,
        Commands::Forecast(args) => telemetry::forecast(args, &config)?,
        Commands::Insights(args) => runtime()?.block_on(insights::insights(args, &config))?,
        Commands::Report(args) => runtime()?.block_on(insights::report(args, &config))?,
        Commands::Serve(args) => runtime()?.block_on(serve::serve(args, config))?,
    }
    Ok(())
}
