//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "binary"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Telemetry generation and forecast subcommands."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ecosphere_common::AppConfig;
use ecosphere_sim::import::{write_csv, write_json};
use ecosphere_sim::{
    utc_offset, window_hours, Archetype, ForecastExtrapolator, Metric, TelemetrySimulator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Building archetype (Campus, Office, Residential, Hospital)
    #[arg(long)]
    archetype: Option<String>,
    /// Hours of history before now
    #[arg(long, allow_negative_numbers = true)]
    hours: Option<i64>,
    /// Random seed; overrides the configured one
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path. Use '-' for stdout.
    #[arg(long, default_value = "-")]
    output: PathBuf,
    /// Explicit output format when the extension is ambiguous
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    #[arg(long)]
    archetype: Option<String>,
    /// Hours of generated history feeding the forecast
    #[arg(long, allow_negative_numbers = true)]
    hours: Option<i64>,
    /// Forecast horizon in hours
    #[arg(long)]
    horizon: Option<u32>,
    /// Print only this metric's series
    #[arg(long)]
    metric: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn archetype_or_default(name: Option<&str>, config: &AppConfig) -> Result<Archetype> {
    let name = name.unwrap_or(&config.simulation.archetype);
    Ok(name.parse::<Archetype>()?)
}

pub(crate) fn simulator(config: &AppConfig, seed: Option<u64>) -> Result<TelemetrySimulator> {
    let offset = utc_offset(config.simulation.utc_offset_hours)?;
    Ok(TelemetrySimulator::from_seed(seed.or(config.simulation.seed)).with_offset(offset))
}

pub(crate) fn determine_format(path: &Path, explicit: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = explicit {
        return format;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => OutputFormat::Csv,
        _ => OutputFormat::Json,
    }
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path)
        .with_context(|| format!("unable to create output file {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

pub fn generate(args: GenerateArgs, config: &AppConfig) -> Result<()> {
    let archetype = archetype_or_default(args.archetype.as_deref(), config)?;
    let hours = match args.hours {
        Some(hours) => window_hours(hours)?,
        None => window_hours(i64::from(config.simulation.history_hours))?,
    };
    let observations = simulator(config, args.seed)?.generate(archetype, hours);

    let mut writer = open_output(&args.output)?;
    match determine_format(&args.output, args.format) {
        OutputFormat::Csv => write_csv(&mut writer, &observations)?,
        OutputFormat::Json => {
            write_json(&mut writer, &observations)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    if args.output.as_os_str() != "-" {
        eprintln!(
            "generated {} observations for {archetype} -> {}",
            observations.len(),
            args.output.display()
        );
    }
    Ok(())
}

pub fn forecast(args: ForecastArgs, config: &AppConfig) -> Result<()> {
    let archetype = archetype_or_default(args.archetype.as_deref(), config)?;
    let hours = match args.hours {
        Some(hours) => window_hours(hours)?,
        None => window_hours(i64::from(config.simulation.history_hours))?,
    };
    let horizon = args.horizon.unwrap_or(config.simulation.forecast_horizon);
    let metric = args.metric.as_deref().map(str::parse::<Metric>).transpose()?;

    let history = simulator(config, args.seed)?.generate(archetype, hours);
    let offset = utc_offset(config.simulation.utc_offset_hours)?;
    let seed = args.seed.or(config.simulation.seed).map(|seed| seed.wrapping_add(1));
    let set = ForecastExtrapolator::from_seed(seed)
        .with_offset(offset)
        .forecast(&history, horizon)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match metric {
        Some(metric) => {
            let points = set.get(metric).unwrap_or_default();
            serde_json::to_writer_pretty(&mut out, points)?;
        }
        None => serde_json::to_writer_pretty(&mut out, &set)?,
    }
    writeln!(out)?;
    Ok(())
}
