//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Insight collaborator capability."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use async_trait::async_trait;

use crate::errors::Result;
use crate::fallback::fallback_recommendations;
use crate::prompt::InsightRequest;
use crate::recommendation::Recommendation;

/// Text-generation capability supplied by the caller.
#[async_trait]
pub trait InsightProvider: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Produce validated recommendations for the request.
    async fn recommend(&self, request: &InsightRequest) -> Result<Vec<Recommendation>>;
}

/// Provider that never leaves the process and always answers with the static list.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

#[async_trait]
impl InsightProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn recommend(&self, request: &InsightRequest) -> Result<Vec<Recommendation>> {
        Ok(fallback_recommendations(request.archetype))
    }
}
