//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "binary"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Insight and report subcommands."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Args;
use ecosphere_common::AppConfig;
use ecosphere_core::DashboardState;
use ecosphere_insights::{
    GeminiClient, InsightProvider, InsightRequest, InsightService, OfflineProvider,
};
use ecosphere_sim::{import_csv_file, window_hours, Metric};
use tracing::info;

use crate::telemetry::{archetype_or_default, simulator};

#[derive(Debug, Args)]
pub struct InsightsArgs {
    #[arg(long)]
    archetype: Option<String>,
    /// Metric to prioritise (energy, carbon, water, waste)
    #[arg(long, default_value = "energy")]
    focus: String,
    /// Skip the remote service and use the static recommendations
    #[arg(long)]
    offline: bool,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(long)]
    archetype: Option<String>,
    #[arg(long, default_value = "energy")]
    focus: String,
    /// Directory receiving the markdown report
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Telemetry CSV to report on instead of synthetic data
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,
    #[arg(long)]
    offline: bool,
}

/// Remote provider when enabled and not forced offline, static list otherwise.
pub(crate) fn insight_service(config: &AppConfig, offline: bool) -> Result<InsightService> {
    let provider: Arc<dyn InsightProvider> = if offline || !config.insights.enabled {
        Arc::new(OfflineProvider)
    } else {
        Arc::new(GeminiClient::from_config(&config.insights)?)
    };
    info!(provider = provider.name(), "insight provider selected");
    Ok(InsightService::new(provider, config.insights.timeout))
}

pub async fn insights(args: InsightsArgs, config: &AppConfig) -> Result<()> {
    let archetype = archetype_or_default(args.archetype.as_deref(), config)?;
    let focus: Metric = args.focus.parse()?;
    let hours = window_hours(i64::from(config.simulation.history_hours))?;
    let observations = simulator(config, args.seed)?.generate(archetype, hours);
    let request = InsightRequest::from_observations(archetype, focus, &observations);

    let outcome = insight_service(config, args.offline)?.refresh(&request).await;
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &outcome)?;
    writeln!(out)?;
    Ok(())
}

pub async fn report(args: ReportArgs, config: &AppConfig) -> Result<()> {
    let mut config = config.clone();
    if let Some(archetype) = args.archetype {
        config.simulation.archetype = archetype;
    }
    let focus: Metric = args.focus.parse()?;
    let mut state = DashboardState::from_config(&config)?;
    state.set_focus(focus);

    if let Some(path) = args.csv.as_deref() {
        let observations = import_csv_file(path, Utc::now())?;
        if !state.import(observations)? {
            return Err(anyhow!("{} contained no data rows", path.display()));
        }
    }

    let service = insight_service(&config, args.offline)?;
    service.refresh(&state.insight_request()).await;
    state.sync_recommendations(&service.board().snapshot());

    let path = state.report(Utc::now()).export(&args.output_dir)?;
    println!("{}", path.display());
    Ok(())
}
