//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Tracked utility metrics."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::errors::SimError;

/// Utility metric tracked by forecasts and recommendations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Metric {
    #[default]
    Energy,
    Carbon,
    Water,
    Waste,
}

impl Metric {
    /// Forecast ordering.
    pub const ALL: [Metric; 4] = [Metric::Energy, Metric::Carbon, Metric::Water, Metric::Waste];

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Metric::Energy => "kWh",
            Metric::Carbon => "kg CO2",
            Metric::Water => "Liters",
            Metric::Waste => "kg",
        }
    }
}

impl FromStr for Metric {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Metric::ALL
            .into_iter()
            .find(|metric| metric.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SimError::invalid(format!("unknown metric '{trimmed}'")))
    }
}
