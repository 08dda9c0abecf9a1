//! ---
//! eco_section: "05-networking-external-interfaces"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "JSON/HTTP surface over the dashboard state."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---

use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use ecosphere_core::{DashboardError, DashboardSnapshot, DashboardState};
use ecosphere_insights::{InsightRequest, InsightService};
use ecosphere_logging::{eco_info, LogContext};
use ecosphere_sim::{import_csv, Archetype, Metric, SimError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared API state exposed to handlers.
pub struct ApiState {
    dashboard: RwLock<DashboardState>,
    insights: Option<Arc<InsightService>>,
}

impl ApiState {
    pub fn new(dashboard: DashboardState, insights: Option<Arc<InsightService>>) -> Self {
        Self {
            dashboard: RwLock::new(dashboard),
            insights,
        }
    }

    fn snapshot(&self) -> DashboardSnapshot {
        self.dashboard.read().snapshot()
    }

    /// Snapshot the request and reserve its token under one read lock, so a
    /// request built from older state can never hold a newer token.
    fn insight_ticket(&self, service: &InsightService) -> (InsightRequest, u64) {
        let dashboard = self.dashboard.read();
        (dashboard.insight_request(), service.ticket())
    }

    /// Ask the collaborator for recommendations and adopt them if still current.
    ///
    /// The dashboard lock is not held while the request is in flight.
    async fn refresh_insights(&self) {
        let Some(service) = self.insights.as_ref() else {
            return;
        };
        let (request, token) = self.insight_ticket(service);
        let outcome = service.complete(token, &request).await;
        let board = service.board().snapshot();
        let adopted = self.dashboard.write().sync_recommendations(&board);
        eco_info!(
            context = LogContext::new()
                .with_archetype(request.archetype.as_str())
                .with_metric(request.focus.as_str())
                .with_request(outcome.token),
            "insight refresh finished (published: {}, adopted: {adopted})",
            outcome.published
        );
    }
}

impl fmt::Debug for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiState")
            .field("insights", &self.insights.is_some())
            .finish_non_exhaustive()
    }
}

/// Handle to the running API server.
#[derive(Debug)]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Dashboard routes without a listener, for embedding and tests.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/archetype", post(post_archetype))
        .route("/api/focus", post(post_focus))
        .route("/api/refresh", post(post_refresh))
        .route("/api/import", post(post_import))
        .route("/api/report", get(get_report))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve the dashboard routes until shut down.
pub fn spawn_api_server(state: Arc<ApiState>, addr: SocketAddr) -> Result<ApiServer> {
    let router = router(state);

    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind API listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure API listener as non-blocking")?;
    let addr = listener.local_addr().unwrap_or(addr);
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %addr, "api server listening");
        if let Err(err) = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(address = %addr, error = %err, "api server exited with error");
            return Err(err.into());
        }
        Ok(())
    });

    Ok(ApiServer {
        addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

#[derive(Debug, Deserialize)]
struct ArchetypeRequest {
    archetype: String,
}

#[derive(Debug, Deserialize)]
struct FocusRequest {
    metric: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        let status = if err.is_invalid_argument() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        Self::new(status, err.to_string())
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = if err.is_invalid_argument() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

async fn get_dashboard(State(state): State<Arc<ApiState>>) -> Json<DashboardSnapshot> {
    Json(state.snapshot())
}

async fn post_archetype(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ArchetypeRequest>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let archetype: Archetype = request.archetype.parse()?;
    let changed = state.dashboard.write().set_archetype(archetype)?;
    if changed {
        state.refresh_insights().await;
    }
    Ok(Json(state.snapshot()))
}

async fn post_focus(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<FocusRequest>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let metric: Metric = request.metric.parse()?;
    let changed = state.dashboard.write().set_focus(metric);
    if changed {
        state.refresh_insights().await;
    }
    Ok(Json(state.snapshot()))
}

async fn post_refresh(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    state.dashboard.write().regenerate()?;
    state.refresh_insights().await;
    Ok(Json(state.snapshot()))
}

async fn post_import(
    State(state): State<Arc<ApiState>>,
    body: String,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let observations = import_csv(&body, Utc::now())?;
    let applied = state.dashboard.write().import(observations)?;
    if !applied {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "csv contained no data rows",
        ));
    }
    state.refresh_insights().await;
    Ok(Json(state.snapshot()))
}

async fn get_report(State(state): State<Arc<ApiState>>) -> Response {
    let dashboard = state.dashboard.read();
    let exporter = dashboard.report(Utc::now());
    let disposition = format!("attachment; filename=\"{}\"", exporter.file_name());
    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exporter.render(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::TimeZone;
    use ecosphere_common::AppConfig;
    use ecosphere_insights::OfflineProvider;
    use ecosphere_sim::{ForecastExtrapolator, TelemetrySimulator};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let dashboard = DashboardState::with_sources(
            &AppConfig::default(),
            TelemetrySimulator::seeded(1),
            ForecastExtrapolator::seeded(2),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        let insights = InsightService::new(Arc::new(OfflineProvider), Duration::from_secs(1));
        router(Arc::new(ApiState::new(dashboard, Some(Arc::new(insights)))))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn ticket_matches_the_state_it_was_taken_from() {
        let dashboard = DashboardState::with_sources(
            &AppConfig::default(),
            TelemetrySimulator::seeded(1),
            ForecastExtrapolator::seeded(2),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        let service = InsightService::new(Arc::new(OfflineProvider), Duration::from_secs(1));
        let state = ApiState::new(dashboard, None);

        let (energy_request, energy_token) = state.insight_ticket(&service);
        state.dashboard.write().set_focus(Metric::Water);
        let (water_request, water_token) = state.insight_ticket(&service);

        assert_eq!(energy_request.focus, Metric::Energy);
        assert_eq!(water_request.focus, Metric::Water);
        assert!(water_token > energy_token);
    }

    #[tokio::test]
    async fn newest_state_wins_when_completions_arrive_out_of_order() {
        let dashboard = DashboardState::with_sources(
            &AppConfig::default(),
            TelemetrySimulator::seeded(1),
            ForecastExtrapolator::seeded(2),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        let service = InsightService::new(Arc::new(OfflineProvider), Duration::from_secs(1));
        let state = ApiState::new(dashboard, None);

        let (campus_request, campus_token) = state.insight_ticket(&service);
        state
            .dashboard
            .write()
            .set_archetype(Archetype::Hospital)
            .unwrap();
        let (hospital_request, hospital_token) = state.insight_ticket(&service);

        assert!(service.complete(hospital_token, &hospital_request).await.published);
        assert!(!service.complete(campus_token, &campus_request).await.published);
        let board = service.board().snapshot();
        assert_eq!(board.recommendations[0].title, "Hospital Peak Shifting");
    }

    #[tokio::test]
    async fn dashboard_snapshot() {
        let response = app()
            .oneshot(Request::get("/api/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["archetype"], "Campus");
        assert_eq!(value["observations"].as_array().unwrap().len(), 25);
    }

    #[tokio::test]
    async fn archetype_change_refreshes_insights() {
        let response = app()
            .oneshot(post_json("/api/archetype", json!({ "archetype": "hospital" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["archetype"], "Hospital");
        assert_eq!(value["recommendations"].as_array().unwrap().len(), 7);
        assert_eq!(value["score"]["predicted"], 95);
    }

    #[tokio::test]
    async fn unknown_names_are_bad_requests() {
        let response = app()
            .oneshot(post_json("/api/archetype", json!({ "archetype": "Factory" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(post_json("/api/focus", json!({ "metric": "steam" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn focus_filters_active_protocols() {
        let response = app()
            .oneshot(post_json("/api/focus", json!({ "metric": "waste" })))
            .await
            .unwrap();
        let value = body_json(response).await;
        assert_eq!(value["focus"], "waste");
        let active = value["active_recommendations"].as_array().unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|rec| rec["type"] == "waste"));
    }

    #[tokio::test]
    async fn import_replaces_window_or_rejects_empty_csv() {
        let csv = "timestamp,energy,water,waste,carbon,occupancy,temperature\n\
                   2024-05-01T10:00:00Z,100,200,30,70,55,21.5\n\
                   2024-05-01T11:00:00Z,120,210,31,84,60,22\n";
        let response = app()
            .oneshot(
                Request::post("/api/import")
                    .header(header::CONTENT_TYPE, "text/csv")
                    .body(Body::from(csv))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["observations"].as_array().unwrap().len(), 2);
        assert_eq!(value["trends"]["energy"], 20);

        let response = app()
            .oneshot(
                Request::post("/api/import")
                    .body(Body::from("timestamp,energy\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn report_is_markdown_attachment() {
        let response = app()
            .oneshot(Request::get("/api/report").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/markdown"));
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_owned();
        assert!(disposition.contains("EcoSphere_Report_Campus_"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("# ECOSPHERE AI - Sustainability Report"));
    }
}
