//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Recommendation records and response validation."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::ops::RangeInclusive;

use ecosphere_sim::Metric;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{InsightError, Result};

pub const IMPACT_RANGE: RangeInclusive<f64> = 1.0..=30.0;
pub const EXPECTED_COUNT: RangeInclusive<usize> = 6..=8;

/// One optimisation protocol suggested for the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: Metric,
    /// Estimated percentage improvement.
    pub impact: f64,
    pub action: String,
}

impl Recommendation {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        kind: Metric,
        impact: f64,
        action: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind,
            impact,
            action: action.into(),
        }
    }
}

/// Check impacts and category coverage.
///
/// A record count outside 6..=8 is tolerated with a warning.
pub fn validate_recommendations(recommendations: &[Recommendation]) -> Result<()> {
    if recommendations.is_empty() {
        return Err(InsightError::Malformed("no recommendations returned".into()));
    }
    if let Some(bad) = recommendations
        .iter()
        .find(|rec| !IMPACT_RANGE.contains(&rec.impact))
    {
        return Err(InsightError::Malformed(format!(
            "impact {} of '{}' is outside 1..=30",
            bad.impact, bad.title
        )));
    }
    let covered: HashSet<Metric> = recommendations.iter().map(|rec| rec.kind).collect();
    let missing: Vec<&str> = Metric::ALL
        .into_iter()
        .filter(|metric| !covered.contains(metric))
        .map(Metric::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(InsightError::Malformed(format!(
            "no recommendation for {}",
            missing.join(", ")
        )));
    }
    if !EXPECTED_COUNT.contains(&recommendations.len()) {
        warn!(
            count = recommendations.len(),
            "recommendation count outside the requested 6-8"
        );
    }
    Ok(())
}

/// Parse and validate a JSON array of recommendations.
///
/// Markdown code fences around the array are tolerated.
pub fn parse_recommendations(text: &str) -> Result<Vec<Recommendation>> {
    let trimmed = strip_fences(text.trim());
    let recommendations: Vec<Recommendation> = serde_json::from_str(trimmed)?;
    validate_recommendations(&recommendations)?;
    Ok(recommendations)
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, impact: f64) -> String {
        format!(
            r#"{{"title":"t-{kind}","description":"d","type":"{kind}","impact":{impact},"action":"a"}}"#
        )
    }

    fn full_set() -> String {
        let items: Vec<String> = ["energy", "energy", "water", "water", "waste", "carbon"]
            .iter()
            .map(|kind| record(kind, 12.0))
            .collect();
        format!("[{}]", items.join(","))
    }

    #[test]
    fn parses_valid_response() {
        let recs = parse_recommendations(&full_set()).unwrap();
        assert_eq!(recs.len(), 6);
        assert_eq!(recs[2].kind, Metric::Water);
        assert_eq!(recs[0].impact, 12.0);
    }

    #[test]
    fn tolerates_code_fences() {
        let fenced = format!("```json\n{}\n```", full_set());
        assert_eq!(parse_recommendations(&fenced).unwrap().len(), 6);
    }

    #[test]
    fn rejects_missing_category() {
        let text = format!("[{},{}]", record("energy", 5.0), record("water", 5.0));
        assert!(matches!(
            parse_recommendations(&text),
            Err(InsightError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_impact() {
        let items: Vec<String> = ["energy", "water", "waste", "carbon"]
            .iter()
            .map(|kind| record(kind, if *kind == "waste" { 45.0 } else { 10.0 }))
            .collect();
        let text = format!("[{}]", items.join(","));
        assert!(matches!(
            parse_recommendations(&text),
            Err(InsightError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_unknown_type_and_garbage() {
        let text = format!("[{}]", record("steam", 10.0));
        assert!(matches!(
            parse_recommendations(&text),
            Err(InsightError::Json(_))
        ));
        assert!(parse_recommendations("not json").is_err());
        assert!(parse_recommendations("[]").is_err());
    }

    #[test]
    fn serializes_kind_as_type() {
        let rec = Recommendation::new("HVAC", "d", Metric::Energy, 15.0, "a");
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["type"], "energy");
    }
}
