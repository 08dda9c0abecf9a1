//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Static recommendations used when the collaborator fails."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use ecosphere_sim::{Archetype, Metric};

use crate::recommendation::Recommendation;

/// Fixed recommendation list covering every metric.
pub fn fallback_recommendations(archetype: Archetype) -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            format!("{archetype} Peak Shifting"),
            "Shift heavy machinery operation to off-peak hours (11 PM - 6 AM) to reduce grid strain.",
            Metric::Energy,
            12.0,
            "Reschedule maintenance",
        ),
        Recommendation::new(
            "HVAC Optimization",
            "Adjust setpoints by 2°C during low occupancy periods detected by occupancy sensors.",
            Metric::Energy,
            15.0,
            "Update BMS settings",
        ),
        Recommendation::new(
            "Water Leak Detection",
            "Anomalous flow patterns in Zone B during night hours suggest a minor leak.",
            Metric::Water,
            8.0,
            "Inspect Zone B plumbing",
        ),
        Recommendation::new(
            "Greywater Recycling",
            "Treat greywater for non-potable uses like irrigation and flushing.",
            Metric::Water,
            18.0,
            "Enable recycling valve",
        ),
        Recommendation::new(
            "Waste Segregation Audit",
            "Contamination levels in recycling bins are high. Improve signage and staff training.",
            Metric::Waste,
            20.0,
            "Staff training session",
        ),
        Recommendation::new(
            "Composting Protocol",
            "Divert organic waste to onsite composting units to reduce landfill contribution.",
            Metric::Waste,
            25.0,
            "Deploy compost bins",
        ),
        Recommendation::new(
            "Carbon Offset Protocol",
            "Purchase renewable energy certificates to offset unavoidable operational emissions.",
            Metric::Carbon,
            10.0,
            "Procure RECs",
        ),
    ]
}
