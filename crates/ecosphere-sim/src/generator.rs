//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Synthetic diurnal telemetry generator."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::f64::consts::PI;

use chrono::{DateTime, Duration, FixedOffset, Offset, Timelike, Utc};
use rand::prelude::*;
use tracing::debug;

use crate::archetype::Archetype;
use crate::errors::{Result, SimError};
use crate::observation::Observation;

/// Default telemetry window in hours.
pub const DEFAULT_HOURS: u32 = 24;

/// Carbon is derived from energy, never sampled.
pub const CARBON_FACTOR: f64 = 0.7;

/// Diurnal usage coefficient in `[0, 1]`, peaking mid-afternoon and
/// bottoming out before dawn.
pub fn diurnal_cycle(hour: u32) -> f64 {
    ((f64::from(hour) - 6.0) * PI / 12.0).sin() * 0.5 + 0.5
}

fn temperature_curve(hour: u32) -> f64 {
    20.0 + ((f64::from(hour) - 8.0) * PI / 12.0).sin() * 5.0
}

/// Largest accepted window: one leap year of hourly observations.
pub const MAX_HOURS: u32 = 366 * 24;

/// Validate a signed hour count coming from an outer surface.
///
/// Negative counts and counts above [`MAX_HOURS`] are rejected.
pub fn window_hours(hours: i64) -> Result<u32> {
    if hours < 0 {
        return Err(SimError::invalid(format!(
            "hour count must be non-negative, got {hours}"
        )));
    }
    if hours > i64::from(MAX_HOURS) {
        return Err(SimError::invalid(format!(
            "hour count {hours} exceeds the maximum of {MAX_HOURS}"
        )));
    }
    Ok(hours as u32)
}

/// Generates hourly observation windows for a building archetype.
///
/// The random source is injected; two simulators seeded identically produce
/// identical magnitudes for the same `now`.
#[derive(Debug, Clone)]
pub struct TelemetrySimulator<R = StdRng> {
    rng: R,
    offset: FixedOffset,
}

impl TelemetrySimulator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeded when a seed is supplied, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl<R: Rng> TelemetrySimulator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            offset: Utc.fix(),
        }
    }

    /// Use a fixed offset when deriving the hour of day.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Generate `hours + 1` observations ending at the current wall-clock time.
    pub fn generate(&mut self, archetype: Archetype, hours: u32) -> Vec<Observation> {
        self.generate_at(archetype, hours, Utc::now())
    }

    /// Parse the archetype name and hour count before generating.
    pub fn generate_named(&mut self, archetype: &str, hours: i64) -> Result<Vec<Observation>> {
        let archetype: Archetype = archetype.parse()?;
        let hours = window_hours(hours)?;
        Ok(self.generate(archetype, hours))
    }

    /// Generate `hours + 1` observations, oldest first, the last one at `now`.
    pub fn generate_at(
        &mut self,
        archetype: Archetype,
        hours: u32,
        now: DateTime<Utc>,
    ) -> Vec<Observation> {
        debug!(archetype = %archetype, hours, "generating telemetry window");
        (0..=hours)
            .rev()
            .map(|offset| {
                let timestamp = now - Duration::hours(i64::from(offset));
                self.sample(archetype, timestamp)
            })
            .collect()
    }

    fn sample(&mut self, archetype: Archetype, timestamp: DateTime<Utc>) -> Observation {
        let base = archetype.profile();
        let hour = timestamp.with_timezone(&self.offset).hour();
        let cycle = diurnal_cycle(hour);
        let randomness = self.rng.gen_range(0.8..1.2);

        let energy = (base.energy * (0.3 + cycle * 0.7) * randomness).round();
        let water = (base.water * (0.2 + cycle * 0.8) * randomness).round();
        let waste = (base.waste * (0.1 + cycle * 0.9) * randomness).round();

        Observation {
            timestamp,
            energy,
            water,
            waste,
            carbon: (energy * CARBON_FACTOR).round(),
            occupancy: ((0.1 + cycle * 0.9) * 100.0).round(),
            temperature: temperature_curve(hour) + self.rng.gen_range(0.0..2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn cycle_is_bounded_and_peaks_mid_afternoon() {
        for hour in 0..24 {
            let cycle = diurnal_cycle(hour);
            assert!((0.0..=1.0).contains(&cycle), "hour {hour}: {cycle}");
        }
        assert!((diurnal_cycle(12) - 1.0).abs() < 1e-9);
        assert!(diurnal_cycle(0).abs() < 1e-9);
        assert!(diurnal_cycle(15) > diurnal_cycle(3));
    }

    #[test]
    fn window_length_and_spacing() {
        let mut sim = TelemetrySimulator::seeded(42);
        let now = fixed_now();
        let data = sim.generate_at(Archetype::Campus, 24, now);
        assert_eq!(data.len(), 25);
        assert_eq!(data.last().unwrap().timestamp, now);
        for pair in data.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }

    #[test]
    fn zero_hours_yields_current_hour_only() {
        let mut sim = TelemetrySimulator::seeded(1);
        let data = sim.generate_at(Archetype::Office, 0, fixed_now());
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].timestamp, fixed_now());
    }

    #[test]
    fn carbon_tracks_energy() {
        let mut sim = TelemetrySimulator::seeded(7);
        for archetype in Archetype::ALL {
            for obs in sim.generate_at(archetype, 72, fixed_now()) {
                assert_eq!(obs.carbon, (obs.energy * 0.7).round());
                assert!((0.0..=100.0).contains(&obs.occupancy));
                assert_eq!(obs.energy, obs.energy.round());
                assert!(obs.energy >= 0.0 && obs.water >= 0.0 && obs.waste >= 0.0);
            }
        }
    }

    #[test]
    fn magnitudes_stay_within_band() {
        let mut sim = TelemetrySimulator::seeded(11);
        let base = Archetype::Hospital.profile();
        for obs in sim.generate_at(Archetype::Hospital, 48, fixed_now()) {
            assert!(obs.energy >= (base.energy * 0.3 * 0.8).floor());
            assert!(obs.energy <= (base.energy * 1.2).ceil());
            assert!(obs.temperature >= 15.0 && obs.temperature <= 27.0);
        }
    }

    #[test]
    fn same_seed_same_window() {
        let now = fixed_now();
        let a = TelemetrySimulator::seeded(99).generate_at(Archetype::Residential, 12, now);
        let b = TelemetrySimulator::seeded(99).generate_at(Archetype::Residential, 12, now);
        assert_eq!(a, b);
    }

    #[test]
    fn offset_shifts_the_cycle() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let utc = TelemetrySimulator::seeded(5).generate_at(Archetype::Office, 0, now);
        let shifted = TelemetrySimulator::seeded(5)
            .with_offset(FixedOffset::east_opt(12 * 3600).unwrap())
            .generate_at(Archetype::Office, 0, now);
        assert_eq!(utc[0].occupancy, 10.0);
        assert_eq!(shifted[0].occupancy, 100.0);
    }

    #[test]
    fn named_generation_validates_inputs() {
        let mut sim = TelemetrySimulator::seeded(3);
        assert!(sim.generate_named("Factory", 24).unwrap_err().is_invalid_argument());
        assert!(sim.generate_named("Office", -1).unwrap_err().is_invalid_argument());
        assert_eq!(sim.generate_named("office", 5).unwrap().len(), 6);
    }

    #[test]
    fn window_is_bounded() {
        assert_eq!(window_hours(i64::from(MAX_HOURS)).unwrap(), MAX_HOURS);
        assert!(window_hours(i64::from(MAX_HOURS) + 1)
            .unwrap_err()
            .is_invalid_argument());
        assert!(window_hours(4_000_000_000).unwrap_err().is_invalid_argument());
        let mut sim = TelemetrySimulator::seeded(3);
        assert!(sim
            .generate_named("Campus", 4_000_000_000)
            .unwrap_err()
            .is_invalid_argument());
    }
}
