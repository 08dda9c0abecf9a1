//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Optimisation insight collaborator and recommendation board."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
//! Optimisation recommendations for the EcoSphere dashboard.
//!
//! An [`InsightProvider`] is the injected text-generation capability;
//! [`GeminiClient`] is the HTTP implementation. [`InsightService`] wraps a
//! provider with a timeout, substitutes [`fallback_recommendations`] on any
//! failure and publishes results to an [`InsightBoard`] where a newer request
//! always wins over an older, slower one.

pub mod errors;
pub mod fallback;
pub mod gemini;
pub mod prompt;
pub mod provider;
pub mod recommendation;
pub mod service;

pub use errors::{InsightError, Result};
pub use fallback::fallback_recommendations;
pub use gemini::GeminiClient;
pub use prompt::{build_prompt, EnergySummary, InsightRequest};
pub use provider::{InsightProvider, OfflineProvider};
pub use recommendation::{parse_recommendations, validate_recommendations, Recommendation};
pub use service::{BoardSnapshot, InsightBoard, InsightOutcome, InsightService, InsightSource};
