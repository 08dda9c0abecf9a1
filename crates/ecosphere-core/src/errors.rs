//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Dashboard state, Eco Index scoring and report export."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use ecosphere_sim::SimError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Simulation(#[from] SimError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// True for caller mistakes such as unknown archetype or metric names.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DashboardError::Simulation(err) if err.is_invalid_argument())
    }
}
