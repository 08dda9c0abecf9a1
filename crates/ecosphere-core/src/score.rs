//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Eco Index sustainability score."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use ecosphere_insights::Recommendation;
use serde::Serialize;

/// Current and optimised Eco Index, both within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EcoScore {
    pub current: u32,
    pub predicted: u32,
}

impl EcoScore {
    pub fn new(base: u32, recommendations: &[Recommendation]) -> Self {
        Self {
            current: base.min(100),
            predicted: predicted_score(base, recommendations),
        }
    }
}

/// `min(100, round(base + total_impact / 4))`.
pub fn predicted_score(base: u32, recommendations: &[Recommendation]) -> u32 {
    let improvement: f64 = recommendations.iter().map(|rec| rec.impact).sum::<f64>() / 4.0;
    let predicted = (f64::from(base) + improvement).round().clamp(0.0, 100.0);
    predicted as u32
}
