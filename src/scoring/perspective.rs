// Google Perspective API provider.
//
// Perspective analyzes text for toxicity, identity attacks, insults, threats,
// etc. It is wrapped behind the ProviderScorer trait so the pipeline can swap
// providers (or run heuristic-only) without touching the gate.
//
// API docs: https://developers.perspectiveapi.com/s/about-the-api-methods

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pacing::RequestPacer;
use super::traits::{CategoryScores, ProviderScorer};

pub const PERSPECTIVE_PROVIDER_ID: &str = "perspective";

const ANALYZE_URL: &str = "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze";

/// Free-tier quota for the analyze endpoint.
const ANALYZE_QPS: f64 = 1.0;

/// Perspective API scorer — the primary provider when an API key is set.
pub struct PerspectiveScorer {
    client: Client,
    api_key: String,
    pacer: RequestPacer,
}

impl PerspectiveScorer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            pacer: RequestPacer::new(ANALYZE_QPS),
        }
    }
}

#[async_trait]
impl ProviderScorer for PerspectiveScorer {
    async fn category_scores(&self, text: &str) -> Result<CategoryScores> {
        self.pacer.until_ready().await;

        let url = format!("{}?key={}", ANALYZE_URL, self.api_key);

        let request = AnalyzeRequest {
            comment: Comment {
                text: text.to_string(),
            },
            requested_attributes: RequestedAttributes {
                toxicity: AttributeConfig {},
                severe_toxicity: AttributeConfig {},
                identity_attack: AttributeConfig {},
                insult: AttributeConfig {},
                profanity: AttributeConfig {},
                threat: AttributeConfig {},
            },
            languages: vec!["en".to_string()],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to call Perspective API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Perspective API returned {}: {}", status, body);
        }

        let result: AnalyzeResponse = response
            .json()
            .await
            .context("Failed to parse Perspective API response")?;

        // Missing attributes score 0 — absence of a signal is not a signal
        let scores = CategoryScores {
            toxicity: extract_score(&result, "TOXICITY").unwrap_or(0.0),
            severe_toxicity: extract_score(&result, "SEVERE_TOXICITY").unwrap_or(0.0),
            identity_attack: extract_score(&result, "IDENTITY_ATTACK").unwrap_or(0.0),
            insult: extract_score(&result, "INSULT").unwrap_or(0.0),
            profanity: extract_score(&result, "PROFANITY").unwrap_or(0.0),
            threat: extract_score(&result, "THREAT").unwrap_or(0.0),
        };

        let preview: String = text.chars().take(50).collect();
        debug!(
            toxicity = scores.toxicity,
            severe_toxicity = scores.severe_toxicity,
            threat = scores.threat,
            text_preview = %preview,
            "Scored text via Perspective"
        );

        Ok(scores)
    }

    fn provider_id(&self) -> &'static str {
        PERSPECTIVE_PROVIDER_ID
    }
}

/// Extract a specific attribute's summary score from the API response.
fn extract_score(response: &AnalyzeResponse, attribute: &str) -> Option<f64> {
    response
        .attribute_scores
        .get(attribute)
        .map(|score| score.summary_score.value)
}

// --- Perspective API request/response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    comment: Comment,
    requested_attributes: RequestedAttributes,
    languages: Vec<String>,
}

#[derive(Serialize)]
struct Comment {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RequestedAttributes {
    toxicity: AttributeConfig,
    severe_toxicity: AttributeConfig,
    identity_attack: AttributeConfig,
    insult: AttributeConfig,
    profanity: AttributeConfig,
    threat: AttributeConfig,
}

#[derive(Serialize)]
struct AttributeConfig {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    attribute_scores: std::collections::HashMap<String, AttributeScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
}
