//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Timed insight requests with fallback and last-write-wins publication."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ecosphere_logging::{eco_info, eco_warn, log_system_event, LogContext, SystemEventOutcome};
use parking_lot::RwLock;
use serde::Serialize;

use crate::fallback::fallback_recommendations;
use crate::prompt::InsightRequest;
use crate::provider::InsightProvider;
use crate::recommendation::Recommendation;

/// Where a published list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Provider,
    Fallback,
}

/// Result of one completed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightOutcome {
    pub token: u64,
    pub source: InsightSource,
    pub recommendations: Vec<Recommendation>,
    /// False when a newer request had already published.
    pub published: bool,
}

/// Currently displayed recommendations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardSnapshot {
    /// Token of the request that produced the list; 0 before the first publish.
    pub token: u64,
    pub source: Option<InsightSource>,
    pub recommendations: Vec<Recommendation>,
}

/// Shared slot holding the latest published recommendations.
#[derive(Debug, Default)]
pub struct InsightBoard {
    inner: RwLock<BoardSnapshot>,
}

impl InsightBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list unless a request with an equal or newer token already published.
    pub fn publish(
        &self,
        token: u64,
        recommendations: Vec<Recommendation>,
        source: InsightSource,
    ) -> bool {
        let mut slot = self.inner.write();
        if token <= slot.token {
            return false;
        }
        *slot = BoardSnapshot {
            token,
            source: Some(source),
            recommendations,
        };
        true
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner.read().clone()
    }
}

/// Runs provider requests under a deadline and publishes to an [`InsightBoard`].
///
/// Any provider error or timeout is replaced by the static fallback list, so a
/// request always produces recommendations.
pub struct InsightService {
    provider: Arc<dyn InsightProvider>,
    timeout: Duration,
    board: Arc<InsightBoard>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for InsightService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightService")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish()
    }
}

impl InsightService {
    pub fn new(provider: Arc<dyn InsightProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            board: Arc::new(InsightBoard::new()),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn board(&self) -> Arc<InsightBoard> {
        Arc::clone(&self.board)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Reserve the next request token. Later tickets supersede earlier ones.
    pub fn ticket(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Ticket and complete a request in one step.
    pub async fn refresh(&self, request: &InsightRequest) -> InsightOutcome {
        let token = self.ticket();
        self.complete(token, request).await
    }

    /// Run the provider for a previously issued token and publish the result.
    pub async fn complete(&self, token: u64, request: &InsightRequest) -> InsightOutcome {
        let ctx = LogContext::new()
            .with_archetype(request.archetype.as_str())
            .with_metric(request.focus.as_str())
            .with_request(token);

        let (recommendations, source) =
            match tokio::time::timeout(self.timeout, self.provider.recommend(request)).await {
                Ok(Ok(recommendations)) => (recommendations, InsightSource::Provider),
                Ok(Err(err)) => {
                    eco_warn!(context = ctx, "{} provider failed: {err}", self.provider.name());
                    (fallback_recommendations(request.archetype), InsightSource::Fallback)
                }
                Err(_) => {
                    eco_warn!(
                        context = ctx,
                        "{} provider timed out after {:?}",
                        self.provider.name(),
                        self.timeout
                    );
                    (fallback_recommendations(request.archetype), InsightSource::Fallback)
                }
            };

        let published = self.board.publish(token, recommendations.clone(), source);
        if published {
            let outcome = match source {
                InsightSource::Provider => SystemEventOutcome::Success,
                InsightSource::Fallback => SystemEventOutcome::Degraded,
            };
            log_system_event(
                Some(&ctx),
                "insights.publish",
                "recommendations published",
                outcome,
            );
        } else {
            eco_info!(context = ctx, "discarding stale recommendations");
        }

        InsightOutcome {
            token,
            source,
            recommendations,
            published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{InsightError, Result};
    use crate::prompt::EnergySummary;
    use async_trait::async_trait;
    use ecosphere_sim::{Archetype, Metric};
    use tokio::sync::Notify;

    fn request(focus: Metric) -> InsightRequest {
        InsightRequest {
            archetype: Archetype::Office,
            focus,
            summary: EnergySummary::default(),
        }
    }

    fn tagged(tag: &str) -> Vec<Recommendation> {
        fallback_recommendations(Archetype::Office)
            .into_iter()
            .map(|mut rec| {
                rec.title = format!("{tag}: {}", rec.title);
                rec
            })
            .collect()
    }

    /// Water requests block until the gate opens; everything else answers at once.
    struct GatedProvider {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl InsightProvider for GatedProvider {
        fn name(&self) -> &str {
            "gated"
        }

        async fn recommend(&self, request: &InsightRequest) -> Result<Vec<Recommendation>> {
            if request.focus == Metric::Water {
                self.gate.notified().await;
            }
            Ok(tagged(request.focus.as_str()))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl InsightProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn recommend(&self, _request: &InsightRequest) -> Result<Vec<Recommendation>> {
            Err(InsightError::Malformed("garbage".into()))
        }
    }

    struct StalledProvider;

    #[async_trait]
    impl InsightProvider for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn recommend(&self, _request: &InsightRequest) -> Result<Vec<Recommendation>> {
            std::future::pending().await
        }
    }

    #[test]
    fn board_rejects_older_tokens() {
        let board = InsightBoard::new();
        assert!(board.publish(2, tagged("two"), InsightSource::Provider));
        assert!(!board.publish(1, tagged("one"), InsightSource::Provider));
        assert!(!board.publish(2, tagged("again"), InsightSource::Fallback));
        let snapshot = board.snapshot();
        assert_eq!(snapshot.token, 2);
        assert!(snapshot.recommendations[0].title.starts_with("two"));
    }

    #[tokio::test]
    async fn newer_request_wins_over_slower_older_one() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(InsightService::new(
            Arc::new(GatedProvider { gate: gate.clone() }),
            Duration::from_secs(5),
        ));

        let slow_token = service.ticket();
        let fast_token = service.ticket();
        let slow = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.complete(slow_token, &request(Metric::Water)).await })
        };

        let fast = service.complete(fast_token, &request(Metric::Energy)).await;
        assert!(fast.published);
        assert_eq!(fast.source, InsightSource::Provider);

        gate.notify_one();
        let slow = slow.await.unwrap();
        assert!(!slow.published);

        let snapshot = service.board().snapshot();
        assert_eq!(snapshot.token, fast_token);
        assert!(snapshot.recommendations[0].title.starts_with("energy"));
    }

    #[tokio::test]
    async fn provider_error_publishes_fallback() {
        let service = InsightService::new(Arc::new(FailingProvider), Duration::from_secs(1));
        let outcome = service.refresh(&request(Metric::Carbon)).await;
        assert_eq!(outcome.source, InsightSource::Fallback);
        assert!(outcome.published);
        assert_eq!(outcome.recommendations, fallback_recommendations(Archetype::Office));
        assert_eq!(service.board().snapshot().source, Some(InsightSource::Fallback));
    }

    #[tokio::test]
    async fn timeout_publishes_fallback() {
        let service = InsightService::new(Arc::new(StalledProvider), Duration::from_millis(30));
        let outcome = service.refresh(&request(Metric::Energy)).await;
        assert_eq!(outcome.source, InsightSource::Fallback);
        assert_eq!(outcome.recommendations.len(), 7);
    }

    #[test]
    fn tickets_increase() {
        let service = InsightService::new(Arc::new(FailingProvider), Duration::from_secs(1));
        let first = service.ticket();
        assert!(service.ticket() > first);
    }
}
