//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Short-horizon forecast extrapolation from the latest observation."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use chrono::{DateTime, Duration, FixedOffset, Offset, Timelike, Utc};
use indexmap::IndexMap;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, SimError};
use crate::generator::diurnal_cycle;
use crate::metric::Metric;
use crate::observation::Observation;

/// Default forecast horizon in hours.
pub const DEFAULT_HORIZON: u32 = 48;

/// One projected hour for a single metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Short `HH:MM` label in the extrapolator's offset.
    pub timestamp: String,
    pub time: DateTime<Utc>,
    /// Projection with optimisation protocols applied.
    pub predicted: u64,
    /// Unoptimised projection.
    pub baseline: u64,
}

/// Per-metric forecast series, ordered energy, carbon, water, waste.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastSet {
    series: IndexMap<Metric, Vec<ForecastPoint>>,
}

impl ForecastSet {
    pub fn get(&self, metric: Metric) -> Option<&[ForecastPoint]> {
        self.series.get(&metric).map(Vec::as_slice)
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.series.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &[ForecastPoint])> {
        self.series
            .iter()
            .map(|(metric, points)| (*metric, points.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of points per metric.
    pub fn horizon(&self) -> usize {
        self.series.values().next().map_or(0, Vec::len)
    }
}

/// Projects baseline and optimised series from a telemetry window.
///
/// Only the last observation anchors the projection. The rest of the history
/// is not fitted; the projection is the diurnal cycle applied to the anchor
/// value with bounded noise.
#[derive(Debug, Clone)]
pub struct ForecastExtrapolator<R = StdRng> {
    rng: R,
    offset: FixedOffset,
}

impl ForecastExtrapolator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl<R: Rng> ForecastExtrapolator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            offset: Utc.fix(),
        }
    }

    /// Use a fixed offset for the hour of day and the point labels.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Extrapolate `horizon` hours past the last observation of `history`.
    pub fn forecast(&mut self, history: &[Observation], horizon: u32) -> Result<ForecastSet> {
        let anchor = history
            .last()
            .ok_or_else(|| SimError::invalid("forecast requires a non-empty history"))?;
        if horizon == 0 {
            return Err(SimError::invalid("forecast horizon must be at least 1 hour"));
        }
        debug!(horizon, anchor = %anchor.timestamp, "extrapolating forecast");

        let mut series = IndexMap::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            let points = self.project(anchor, metric, horizon);
            series.insert(metric, points);
        }
        Ok(ForecastSet { series })
    }

    fn project(&mut self, anchor: &Observation, metric: Metric, horizon: u32) -> Vec<ForecastPoint> {
        let anchor_value = anchor.value(metric).max(0.0);
        (1..=horizon)
            .map(|step| {
                let time = anchor.timestamp + Duration::hours(i64::from(step));
                let local = time.with_timezone(&self.offset);
                let cycle = diurnal_cycle(local.hour());
                let baseline = anchor_value * (0.6 + cycle * 0.4) * self.rng.gen_range(0.9..1.1);
                let predicted = baseline * self.rng.gen_range(0.8..0.9);
                ForecastPoint {
                    timestamp: local.format("%H:%M").to_string(),
                    time,
                    predicted: predicted.round() as u64,
                    baseline: baseline.round() as u64,
                }
            })
            .collect()
    }
}
