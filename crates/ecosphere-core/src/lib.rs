//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Dashboard state, Eco Index scoring and report export."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
pub mod errors;
pub mod report;
pub mod score;
pub mod state;

pub use errors::{DashboardError, Result};
pub use report::ReportExporter;
pub use score::{predicted_score, EcoScore};
pub use state::{trend_percent, DashboardSnapshot, DashboardState};
