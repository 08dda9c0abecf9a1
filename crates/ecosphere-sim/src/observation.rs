//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Hourly building observation records."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metric::Metric;

/// One hourly measurement, synthetic or imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    /// kWh
    pub energy: f64,
    /// Liters
    pub water: f64,
    /// kg
    pub waste: f64,
    /// kg CO2
    pub carbon: f64,
    /// Percent, 0..=100.
    pub occupancy: f64,
    /// Degrees Celsius, not rounded.
    pub temperature: f64,
}

impl Observation {
    /// All-zero observation used when no telemetry is loaded.
    pub fn zeroed(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            energy: 0.0,
            water: 0.0,
            waste: 0.0,
            carbon: 0.0,
            occupancy: 0.0,
            temperature: 0.0,
        }
    }

    /// Value of a tracked metric on this observation.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Energy => self.energy,
            Metric::Carbon => self.carbon,
            Metric::Water => self.water,
            Metric::Waste => self.waste,
        }
    }
}
