// Scoring contract — the swap-ready provider abstraction.
//
// A ProviderScorer produces raw per-category scores; the verdict derivation
// (threshold, severity precedence, reason strings) lives here so every
// provider yields identically-shaped results.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category score above this bar marks the text as toxic.
pub const TOXIC_THRESHOLD: f64 = 0.7;

/// The outcome of scoring a single piece of text.
///
/// Overwritten on the item as its auto-moderation snapshot; the fields also
/// flow into the audit entry that records the resulting transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub is_toxic: bool,
    /// 0.0 (benign) to 1.0 (certain violation)
    pub confidence: f64,
    /// Human-readable justifications, headline first, no duplicates
    pub reasons: Vec<String>,
    /// Which scorer produced this result ("perspective", "heuristic-v1")
    pub provider_id: String,
    pub scored_at: DateTime<Utc>,
    /// True when a configured primary provider failed and the heuristic
    /// answered instead. Observability only — never a caller-facing error.
    pub degraded: bool,
}

/// Raw per-category scores (all 0.0 to 1.0) from a provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryScores {
    pub toxicity: f64,
    pub severe_toxicity: f64,
    pub identity_attack: f64,
    pub insult: f64,
    pub profanity: f64,
    pub threat: f64,
}

impl CategoryScores {
    /// The overall confidence is the worst (highest) category score.
    pub fn max_score(&self) -> f64 {
        [
            self.toxicity,
            self.severe_toxicity,
            self.identity_attack,
            self.insult,
            self.profanity,
            self.threat,
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

/// Trait for primary scoring providers. Async because providers are HTTP APIs.
#[async_trait]
pub trait ProviderScorer: Send + Sync {
    /// Score a single text, returning raw category scores.
    async fn category_scores(&self, text: &str) -> Result<CategoryScores>;

    /// Stable identifier recorded on every result this provider produces.
    fn provider_id(&self) -> &'static str;
}

/// Derive the toxicity verdict from raw category scores.
///
/// Severity precedence: severe toxicity > identity attack > threat > insult
/// > profanity > generic toxicity. The first category above the bar supplies
/// the headline reason; every category above the bar is listed once.
pub fn verdict(scores: &CategoryScores) -> (bool, f64, Vec<String>) {
    let confidence = scores.max_score().clamp(0.0, 1.0);
    let is_toxic = confidence > TOXIC_THRESHOLD;

    let mut reasons = Vec::new();
    if is_toxic {
        let ordered = [
            (scores.severe_toxicity, "Severe toxicity detected"),
            (scores.identity_attack, "Identity attack detected"),
            (scores.threat, "Threat detected"),
            (scores.insult, "Insult detected"),
            (scores.profanity, "Profanity detected"),
            (scores.toxicity, "Toxic content detected"),
        ];
        for (score, reason) in ordered {
            if score > TOXIC_THRESHOLD {
                reasons.push(reason.to_string());
            }
        }
        // max_score > threshold guarantees at least one category qualified,
        // but guard anyway so a verdict never flags without a reason
        if reasons.is_empty() {
            reasons.push("Toxic content detected".to_string());
        }
    }

    (is_toxic, confidence, reasons)
}
