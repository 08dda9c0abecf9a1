//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Optimisation insight collaborator and recommendation board."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightError>;

/// Collaborator failures. All of them are recovered by the static fallback.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("api key environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("insight request timed out")]
    Timeout,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed recommendations: {0}")]
    Malformed(String),
}
