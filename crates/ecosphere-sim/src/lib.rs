//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "01-bootstrap"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Simulation module exports and shared types."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
//! Synthetic building telemetry for the EcoSphere dashboard.
//!
//! [`TelemetrySimulator`] fabricates hourly [`Observation`]s following a diurnal
//! usage cycle and [`ForecastExtrapolator`] projects baseline/optimised series
//! from the most recent observation. Both take their random source as an
//! injected [`rand::Rng`] so callers can seed them for reproducible shapes.

pub mod archetype;
pub mod errors;
pub mod forecast;
pub mod generator;
pub mod import;
pub mod metric;
pub mod observation;

pub use archetype::{Archetype, BaseProfile};
pub use errors::{Result, SimError};
pub use forecast::{ForecastExtrapolator, ForecastPoint, ForecastSet, DEFAULT_HORIZON};
pub use generator::{diurnal_cycle, window_hours, TelemetrySimulator, DEFAULT_HOURS, MAX_HOURS};
pub use import::{import_csv, import_csv_file, parse_csv, FieldValue, ImportedRecord};
pub use metric::Metric;
pub use observation::Observation;

/// Build a fixed offset from whole hours east of UTC.
pub fn utc_offset(hours: i32) -> Result<chrono::FixedOffset> {
    chrono::FixedOffset::east_opt(hours.saturating_mul(3600)).ok_or_else(|| {
        SimError::InvalidArgument(format!("utc offset of {hours} hours is out of range"))
    })
}
