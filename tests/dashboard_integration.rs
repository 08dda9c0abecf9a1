//! ---
//! eco_section: "15-testing-qa-runbook"
//! eco_subsection: "tests"
//! eco_type: "source"
//! eco_scope: "test"
//! eco_description: "Telemetry to report flow across the workspace crates."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ecosphere_common::AppConfig;
use ecosphere_core::DashboardState;
use ecosphere_insights::{
    InsightError, InsightProvider, InsightRequest, InsightService, InsightSource, Recommendation,
};
use ecosphere_sim::import::write_csv;
use ecosphere_sim::{
    import_csv_file, Archetype, ForecastExtrapolator, Metric, TelemetrySimulator,
};
use tempfile::tempdir;

/// Answers with a short carbon-heavy list that fails category coverage.
struct IncompleteProvider;

#[async_trait]
impl InsightProvider for IncompleteProvider {
    fn name(&self) -> &str {
        "incomplete"
    }

    async fn recommend(
        &self,
        _request: &InsightRequest,
    ) -> ecosphere_insights::Result<Vec<Recommendation>> {
        let recs = vec![Recommendation::new("Solar", "Add panels", Metric::Carbon, 20.0, "Install")];
        ecosphere_insights::validate_recommendations(&recs)?;
        Ok(recs)
    }
}

/// Always returns four valid records, one per metric.
struct EchoProvider;

#[async_trait]
impl InsightProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn recommend(
        &self,
        request: &InsightRequest,
    ) -> ecosphere_insights::Result<Vec<Recommendation>> {
        if request.summary.peak <= 0.0 {
            return Err(InsightError::Malformed("no telemetry".into()));
        }
        Ok(Metric::ALL
            .into_iter()
            .map(|metric| {
                Recommendation::new(
                    format!("{} {metric}", request.archetype),
                    "Echoed",
                    metric,
                    4.0,
                    "Review",
                )
            })
            .collect())
    }
}

fn dashboard(archetype: &str) -> DashboardState {
    let mut config = AppConfig::default();
    config.simulation.archetype = archetype.into();
    DashboardState::with_sources(
        &config,
        TelemetrySimulator::seeded(10),
        ForecastExtrapolator::seeded(11),
        Utc.with_ymd_and_hms(2024, 7, 1, 15, 0, 0).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn exported_telemetry_drives_a_report() {
    let dir = tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 7, 1, 15, 0, 0).unwrap();
    let observations = TelemetrySimulator::seeded(3).generate_at(Archetype::Hospital, 24, now);
    let csv_path = dir.path().join("telemetry.csv");
    write_csv(fs::File::create(&csv_path).unwrap(), &observations).unwrap();

    let mut state = dashboard("Hospital");
    let imported = import_csv_file(&csv_path, now).unwrap();
    assert!(state.import(imported).unwrap());
    assert_eq!(state.current().energy, observations.last().unwrap().energy);
    assert_eq!(state.forecast().horizon(), 48);

    let service = InsightService::new(Arc::new(EchoProvider), Duration::from_secs(1));
    let outcome = service.refresh(&state.insight_request()).await;
    assert_eq!(outcome.source, InsightSource::Provider);
    assert!(state.sync_recommendations(&service.board().snapshot()));
    // 68 + 16 / 4
    assert_eq!(state.score().predicted, 72);

    let path = state
        .report(now)
        .export(&dir.path().join("reports"))
        .unwrap();
    assert!(path.ends_with("EcoSphere_Report_Hospital_2024-07-01.md"));
    let report = fs::read_to_string(path).unwrap();
    assert!(report.contains("- Hospital energy: Echoed (Impact: -4%)"));
}

#[tokio::test]
async fn invalid_provider_output_falls_back() {
    let mut state = dashboard("Office");
    state.set_focus(Metric::Water);
    let service = InsightService::new(Arc::new(IncompleteProvider), Duration::from_secs(1));
    let outcome = service.refresh(&state.insight_request()).await;
    assert_eq!(outcome.source, InsightSource::Fallback);

    state.sync_recommendations(&service.board().snapshot());
    let active = state.active_recommendations();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|rec| rec.kind == Metric::Water));
    assert_eq!(state.recommendations()[0].title, "Office Peak Shifting");
}
