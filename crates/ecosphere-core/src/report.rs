//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Markdown sustainability report export."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::fmt::Write as _;
use std::{fs, path::Path, path::PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::Result;
use crate::state::DashboardState;

const FOOTER: &str = "EcoSphere AI v0.1.0";

#[derive(Debug)]
pub struct ReportExporter<'a> {
    state: &'a DashboardState,
    generated_at: DateTime<Utc>,
}

impl<'a> ReportExporter<'a> {
    pub fn new(state: &'a DashboardState, generated_at: DateTime<Utc>) -> Self {
        Self {
            state,
            generated_at,
        }
    }

    /// `EcoSphere_Report_<Archetype>_<YYYY-MM-DD>.md`
    pub fn file_name(&self) -> String {
        format!(
            "EcoSphere_Report_{}_{}.md",
            self.state.archetype(),
            self.generated_at.format("%Y-%m-%d")
        )
    }

    pub fn render(&self) -> String {
        let state = self.state;
        let current = state.current();
        let score = state.score();

        let mut out = String::new();
        let _ = writeln!(out, "# ECOSPHERE AI - Sustainability Report");
        let _ = writeln!(
            out,
            "Generated on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let Some(institution) = state.institution() {
            let _ = writeln!(out, "Institution: {institution}");
        }
        let _ = writeln!(out, "Building Type: {}", state.archetype());
        let _ = writeln!(out);
        let _ = writeln!(out, "## Current Metrics");
        let _ = writeln!(out, "- Energy Consumption: {} kWh", current.energy);
        let _ = writeln!(out, "- Carbon Footprint: {} kg CO2", current.carbon);
        let _ = writeln!(out, "- Water Usage: {} L", current.water);
        let _ = writeln!(out, "- Waste Generation: {} kg", current.waste);
        let _ = writeln!(out, "- Occupancy: {}%", current.occupancy);
        let _ = writeln!(out, "- Temperature: {:.1}°C", current.temperature);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Sustainability Score");
        let _ = writeln!(out, "- Current Score: {}", score.current);
        let _ = writeln!(out, "- Predicted Score (Optimized): {}", score.predicted);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Active Optimization Protocols");
        for rec in state.active_recommendations() {
            let _ = writeln!(
                out,
                "- {}: {} (Impact: -{}%)",
                rec.title, rec.description, rec.impact
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "---");
        let _ = write!(out, "{FOOTER}");
        out
    }

    /// Write the report into `output_dir`, creating it when missing.
    pub fn export(&self, output_dir: &Path) -> Result<PathBuf> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }
        let path = output_dir.join(self.file_name());
        fs::write(&path, self.render())?;
        info!(path = %path.display(), "report exported");
        Ok(path)
    }
}
