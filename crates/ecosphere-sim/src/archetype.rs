//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Building archetypes and their baseline utility magnitudes."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::errors::SimError;

/// Baseline magnitudes used to scale the synthetic diurnal curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseProfile {
    /// kWh
    pub energy: f64,
    /// Liters
    pub water: f64,
    /// kg
    pub waste: f64,
    /// kg CO2
    pub carbon: f64,
}

/// Closed set of building usage profiles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
pub enum Archetype {
    #[default]
    Campus,
    Office,
    Residential,
    Hospital,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Campus,
        Archetype::Office,
        Archetype::Residential,
        Archetype::Hospital,
    ];

    /// Baseline magnitudes for the archetype.
    pub const fn profile(self) -> BaseProfile {
        match self {
            Archetype::Campus => BaseProfile {
                energy: 500.0,
                water: 1000.0,
                waste: 200.0,
                carbon: 350.0,
            },
            Archetype::Office => BaseProfile {
                energy: 300.0,
                water: 400.0,
                waste: 50.0,
                carbon: 200.0,
            },
            Archetype::Residential => BaseProfile {
                energy: 150.0,
                water: 600.0,
                waste: 30.0,
                carbon: 100.0,
            },
            Archetype::Hospital => BaseProfile {
                energy: 800.0,
                water: 2000.0,
                waste: 400.0,
                carbon: 600.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl FromStr for Archetype {
    type Err = SimError;

    /// Case-insensitive; anything outside the four archetypes is rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Archetype::ALL
            .into_iter()
            .find(|archetype| archetype.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SimError::invalid(format!("unknown building archetype '{trimmed}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_table_matches_reference_values() {
        let office = Archetype::Office.profile();
        assert_eq!(office.energy, 300.0);
        assert_eq!(office.water, 400.0);
        assert_eq!(office.waste, 50.0);
        assert_eq!(office.carbon, 200.0);
        assert_eq!(Archetype::Hospital.profile().water, 2000.0);
        assert_eq!(Archetype::Residential.profile().energy, 150.0);
        assert_eq!(Archetype::Campus.profile().carbon, 350.0);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("office".parse::<Archetype>().unwrap(), Archetype::Office);
        assert_eq!(" Hospital ".parse::<Archetype>().unwrap(), Archetype::Hospital);
        assert_eq!(Archetype::Residential.to_string(), "Residential");
    }

    #[test]
    fn rejects_unknown_archetype() {
        let err = "Warehouse".parse::<Archetype>().unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
