//! ---
//! eco_section: "05-networking-external-interfaces"
//! eco_subsection: "binary"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "HTTP serve subcommand."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ecosphere_api::{spawn_api_server, ApiState};
use ecosphere_common::{init_tracing, AppConfig};
use ecosphere_core::DashboardState;
use ecosphere_insights::InsightRequest;
use tracing::info;

use crate::insights::insight_service;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address; overrides `[api].listen`
    #[arg(long)]
    listen: Option<SocketAddr>,
    #[arg(long)]
    offline: bool,
}

pub async fn serve(args: ServeArgs, config: AppConfig) -> Result<()> {
    init_tracing("ecosphere-api", &config.logging)?;
    let mut dashboard = DashboardState::from_config(&config)?;
    let service = Arc::new(insight_service(&config, args.offline)?);

    let request: InsightRequest = dashboard.insight_request();
    service.refresh(&request).await;
    dashboard.sync_recommendations(&service.board().snapshot());

    let addr = args.listen.unwrap_or(config.api.listen);
    let server = spawn_api_server(Arc::new(ApiState::new(dashboard, Some(service))), addr)?;
    info!(address = %server.addr(), "dashboard api ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");
    server.shutdown().await
}
