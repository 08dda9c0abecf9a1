//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Dashboard state shared by the CLI and the HTTP surface."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use ecosphere_common::AppConfig;
use ecosphere_insights::{BoardSnapshot, InsightRequest, Recommendation};
use ecosphere_logging::{eco_debug, eco_info, LogContext};
use ecosphere_sim::{
    utc_offset, window_hours, Archetype, ForecastExtrapolator, ForecastSet, Metric, Observation,
    TelemetrySimulator,
};
use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::Result;
use crate::report::ReportExporter;
use crate::score::EcoScore;

/// Percent change from `previous` to `current`, 0 when `previous` is 0.
pub fn trend_percent(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return 0;
    }
    ((current - previous) / previous * 100.0).round() as i64
}

/// Serializable view of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub archetype: Archetype,
    pub focus: Metric,
    pub institution: Option<String>,
    pub current: Observation,
    pub previous: Observation,
    pub trends: IndexMap<Metric, i64>,
    pub score: EcoScore,
    pub observations: Vec<Observation>,
    pub forecast: ForecastSet,
    pub recommendations: Vec<Recommendation>,
    pub active_recommendations: Vec<Recommendation>,
}

/// Archetype, focus metric, telemetry window, forecast and recommendations.
#[derive(Debug)]
pub struct DashboardState {
    archetype: Archetype,
    focus: Metric,
    observations: Vec<Observation>,
    forecast: ForecastSet,
    recommendations: Vec<Recommendation>,
    recommendations_token: u64,
    base_score: u32,
    institution: Option<String>,
    history_hours: u32,
    horizon: u32,
    simulator: TelemetrySimulator,
    extrapolator: ForecastExtrapolator,
}

impl DashboardState {
    /// Build the state from configuration and generate the initial window.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let seed = config.simulation.seed;
        Self::with_sources(
            config,
            TelemetrySimulator::from_seed(seed),
            ForecastExtrapolator::from_seed(seed.map(|seed| seed.wrapping_add(1))),
            Utc::now(),
        )
    }

    /// Like [`DashboardState::from_config`] with explicit random sources and clock.
    pub fn with_sources(
        config: &AppConfig,
        simulator: TelemetrySimulator,
        extrapolator: ForecastExtrapolator,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let archetype: Archetype = config.simulation.archetype.parse()?;
        let offset = utc_offset(config.simulation.utc_offset_hours)?;
        let mut state = Self {
            archetype,
            focus: Metric::default(),
            observations: Vec::new(),
            forecast: ForecastSet::default(),
            recommendations: Vec::new(),
            recommendations_token: 0,
            base_score: config.dashboard.base_score,
            institution: config.dashboard.institution.clone(),
            history_hours: window_hours(i64::from(config.simulation.history_hours))?,
            horizon: config.simulation.forecast_horizon,
            simulator: simulator.with_offset(offset),
            extrapolator: extrapolator.with_offset(offset),
        };
        state.regenerate_at(now)?;
        Ok(state)
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn focus(&self) -> Metric {
        self.focus
    }

    pub fn institution(&self) -> Option<&str> {
        self.institution.as_deref()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn forecast(&self) -> &ForecastSet {
        &self.forecast
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    /// Latest observation, or an all-zero one when nothing is loaded.
    pub fn current(&self) -> Observation {
        self.observations
            .last()
            .cloned()
            .unwrap_or_else(|| Observation::zeroed(Utc::now()))
    }

    /// Second to last observation, falling back to [`DashboardState::current`].
    pub fn previous(&self) -> Observation {
        match self.observations.len() {
            0 | 1 => self.current(),
            len => self.observations[len - 2].clone(),
        }
    }

    pub fn trend(&self, metric: Metric) -> i64 {
        trend_percent(self.current().value(metric), self.previous().value(metric))
    }

    pub fn score(&self) -> EcoScore {
        EcoScore::new(self.base_score, &self.recommendations)
    }

    /// Recommendations whose type matches the focus metric.
    pub fn active_recommendations(&self) -> Vec<Recommendation> {
        self.recommendations
            .iter()
            .filter(|rec| rec.kind == self.focus)
            .cloned()
            .collect()
    }

    /// Request describing the current window for the insight collaborator.
    pub fn insight_request(&self) -> InsightRequest {
        InsightRequest::from_observations(self.archetype, self.focus, &self.observations)
    }

    pub fn regenerate(&mut self) -> Result<()> {
        self.regenerate_at(Utc::now())
    }

    /// Replace the window with fresh synthetic telemetry ending at `now`.
    pub fn regenerate_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let observations = self
            .simulator
            .generate_at(self.archetype, self.history_hours, now);
        self.forecast = self.extrapolator.forecast(&observations, self.horizon)?;
        self.observations = observations;
        let archetype = self.archetype.as_str();
        eco_debug!(
            context = LogContext::new().with_archetype(archetype),
            "regenerated {} observations",
            self.observations.len()
        );
        Ok(())
    }

    /// Replace the window with imported observations.
    ///
    /// Returns `false` and leaves the state untouched when `observations` is empty.
    pub fn import(&mut self, observations: Vec<Observation>) -> Result<bool> {
        if observations.is_empty() {
            return Ok(false);
        }
        self.forecast = self.extrapolator.forecast(&observations, self.horizon)?;
        eco_info!(
            context = LogContext::new().with_archetype(self.archetype.as_str()),
            "imported {} observations",
            observations.len()
        );
        self.observations = observations;
        Ok(true)
    }

    /// Switch archetype and regenerate. Returns whether anything changed.
    pub fn set_archetype(&mut self, archetype: Archetype) -> Result<bool> {
        if archetype == self.archetype {
            return Ok(false);
        }
        self.archetype = archetype;
        self.regenerate()?;
        Ok(true)
    }

    pub fn set_focus(&mut self, focus: Metric) -> bool {
        if focus == self.focus {
            return false;
        }
        self.focus = focus;
        true
    }

    /// Adopt the board's recommendations if they are newer than the ones held.
    pub fn sync_recommendations(&mut self, board: &BoardSnapshot) -> bool {
        if board.token <= self.recommendations_token {
            return false;
        }
        self.recommendations_token = board.token;
        self.recommendations = board.recommendations.clone();
        true
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            archetype: self.archetype,
            focus: self.focus,
            institution: self.institution.clone(),
            current: self.current(),
            previous: self.previous(),
            trends: Metric::ALL
                .into_iter()
                .map(|metric| (metric, self.trend(metric)))
                .collect(),
            score: self.score(),
            observations: self.observations.clone(),
            forecast: self.forecast.clone(),
            recommendations: self.recommendations.clone(),
            active_recommendations: self.active_recommendations(),
        }
    }

    pub fn report(&self, generated_at: DateTime<Utc>) -> ReportExporter<'_> {
        ReportExporter::new(self, generated_at)
    }
}
