//! ---
//! eco_section: "08-optimisation-insights"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "HTTP client for the Gemini text-generation endpoint."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use async_trait::async_trait;
use ecosphere_common::InsightsConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::errors::{InsightError, Result};
use crate::prompt::{build_prompt, InsightRequest};
use crate::provider::InsightProvider;
use crate::recommendation::{parse_recommendations, Recommendation};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Calls `models/{model}:generateContent` and validates the JSON answer.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    url: Url,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    pub fn from_config(config: &InsightsConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let url = config
            .endpoint
            .join(&format!("v1beta/models/{}:generateContent", config.model))?;
        let api_key = config.api_key();
        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "no api key configured, insight requests will use the fallback list"
            );
        }
        Ok(Self {
            http,
            url,
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request_body(prompt: String) -> serde_json::Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        })
    }
}

/// First candidate text of a `generateContent` response.
fn response_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| InsightError::Malformed("response carried no candidate text".into()))
}

#[async_trait]
impl InsightProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn recommend(&self, request: &InsightRequest) -> Result<Vec<Recommendation>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| InsightError::MissingApiKey(self.api_key_env.clone()))?;
        debug!(url = %self.url, archetype = %request.archetype, focus = %request.focus, "requesting recommendations");
        let body = self
            .http
            .post(self.url.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&Self::request_body(build_prompt(request)))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_recommendations(&response_text(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::EnergySummary;
    use ecosphere_sim::{Archetype, Metric};

    fn config() -> InsightsConfig {
        InsightsConfig {
            api_key_env: "ECOSPHERE_TEST_UNSET_GEMINI_KEY".into(),
            ..InsightsConfig::default()
        }
    }

    #[test]
    fn builds_generate_content_url() {
        let client = GeminiClient::from_config(&config()).unwrap();
        assert_eq!(
            client.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
        // The key travels in a header, never in the query string.
        assert!(client.url().query().is_none());
        assert_eq!(API_KEY_HEADER, "x-goog-api-key");
    }

    #[test]
    fn body_requests_json_output() {
        let body = GeminiClient::request_body("hello".into());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn extracts_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[1]"}]}}]}"#;
        assert_eq!(response_text(body).unwrap(), "[1]");
    }

    #[test]
    fn empty_candidates_are_malformed() {
        assert!(matches!(
            response_text(r#"{"candidates":[]}"#),
            Err(InsightError::Malformed(_))
        ));
        assert!(matches!(
            response_text(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#),
            Err(InsightError::Malformed(_))
        ));
        assert!(matches!(response_text("<html>"), Err(InsightError::Json(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::from_config(&config()).unwrap();
        let request = InsightRequest {
            archetype: Archetype::Campus,
            focus: Metric::Energy,
            summary: EnergySummary::default(),
        };
        assert!(matches!(
            client.recommend(&request).await,
            Err(InsightError::MissingApiKey(_))
        ));
    }
}
