//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Summary statistics and prompt construction."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use ecosphere_sim::{Archetype, Metric, Observation};
use serde::{Deserialize, Serialize};

/// Observations summarised for a request.
pub const SUMMARY_WINDOW: usize = 24;

/// Mean and peak energy over the most recent observations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergySummary {
    pub mean: f64,
    pub peak: f64,
}

impl EnergySummary {
    /// Summarise the last [`SUMMARY_WINDOW`] observations; zero when empty.
    pub fn from_observations(observations: &[Observation]) -> Self {
        let start = observations.len().saturating_sub(SUMMARY_WINDOW);
        let recent = &observations[start..];
        if recent.is_empty() {
            return Self::default();
        }
        let total: f64 = recent.iter().map(|obs| obs.energy).sum();
        let peak = recent
            .iter()
            .map(|obs| obs.energy)
            .fold(f64::NEG_INFINITY, f64::max);
        Self {
            mean: total / recent.len() as f64,
            peak,
        }
    }
}

/// Everything the collaborator needs to produce recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    pub archetype: Archetype,
    pub focus: Metric,
    pub summary: EnergySummary,
}

impl InsightRequest {
    pub fn from_observations(
        archetype: Archetype,
        focus: Metric,
        observations: &[Observation],
    ) -> Self {
        Self {
            archetype,
            focus,
            summary: EnergySummary::from_observations(observations),
        }
    }
}

/// Render the free-text prompt sent to the text-generation service.
pub fn build_prompt(request: &InsightRequest) -> String {
    let InsightRequest {
        archetype,
        focus,
        summary,
    } = request;
    format!(
        "You are a building sustainability analyst. Review this {archetype} facility:\n\
         - Average Energy: {mean:.2} kWh\n\
         - Peak Energy: {peak:.2} kWh\n\
         - Building Type: {archetype}\n\
         - Primary Focus Area: {focus}\n\
         \n\
         Provide 6-8 specific, actionable optimization recommendations as JSON.\n\
         Include at least one recommendation for EACH category: 'energy', 'water', 'waste', 'carbon'.\n\
         Prioritize recommendations for the Primary Focus Area ({focus}).\n\
         \n\
         Each recommendation must have:\n\
         - title: short title\n\
         - description: detailed explanation\n\
         - type: one of 'energy', 'water', 'waste', 'carbon'\n\
         - impact: estimated percentage improvement (number 1-30)\n\
         - action: the primary action to take\n\
         \n\
         Respond with a valid JSON array of objects only.",
        mean = summary.mean,
        peak = summary.peak,
    )
}
