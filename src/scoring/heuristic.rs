// Local heuristic scorer — the deterministic fallback path.
//
// Matches the text against the policy word lists and two shape signals
// (shouting, symbol soup). Pure: same text + same policy table always yields
// the same verdict, which is what makes degraded-mode behavior testable.
//
// Confidence is capped below 1.0 to signal "heuristic, not authoritative".

use chrono::Utc;

use super::policy::PolicyTable;
use super::traits::ScoreResult;

pub const HEURISTIC_PROVIDER_ID: &str = "heuristic-v1";

/// Confidence floor applied per matching word-list category.
const CATEGORY_FLOOR: f64 = 0.7;
/// Uppercase ratio above this adds a shouting reason (floor 0.6).
const UPPERCASE_RATIO_THRESHOLD: f64 = 0.5;
const UPPERCASE_FLOOR: f64 = 0.6;
/// Symbol ratio above this adds an obfuscation reason (floor 0.5).
const SYMBOL_RATIO_THRESHOLD: f64 = 0.3;
const SYMBOL_FLOOR: f64 = 0.5;
/// Hard cap — a heuristic verdict is never presented as certainty.
const CONFIDENCE_CAP: f64 = 0.95;

pub struct HeuristicScorer {
    policy: PolicyTable,
}

impl HeuristicScorer {
    pub fn new(policy: PolicyTable) -> Self {
        Self { policy }
    }

    /// Score a text against the policy table. Infallible and synchronous —
    /// this path must never block the gate on I/O.
    pub fn score(&self, text: &str) -> ScoreResult {
        let lower = text.to_lowercase();
        let mut confidence: f64 = 0.0;
        let mut reasons: Vec<String> = Vec::new();

        for (category, keywords) in self.policy.categories() {
            if keywords.iter().any(|w| lower.contains(w.as_str())) {
                push_unique(&mut reasons, category.reason());
                confidence = confidence.max(CATEGORY_FLOOR);
            }
        }

        let total = text.chars().count();
        if total > 0 {
            let uppercase = text.chars().filter(|c| c.is_uppercase()).count();
            if uppercase as f64 / total as f64 > UPPERCASE_RATIO_THRESHOLD {
                push_unique(&mut reasons, "Excessive capitalization (shouting)");
                confidence = confidence.max(UPPERCASE_FLOOR);
            }

            // Whitespace is excluded from the symbol count so ordinary prose
            // (spaces, one comma) stays well under the bar.
            let symbols = text
                .chars()
                .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
                .count();
            if symbols as f64 / total as f64 > SYMBOL_RATIO_THRESHOLD {
                push_unique(&mut reasons, "Excessive symbols or obfuscated text");
                confidence = confidence.max(SYMBOL_FLOOR);
            }
        }

        let is_toxic = !reasons.is_empty();
        ScoreResult {
            is_toxic,
            confidence: confidence.min(CONFIDENCE_CAP),
            reasons,
            provider_id: HEURISTIC_PROVIDER_ID.to_string(),
            scored_at: Utc::now(),
            degraded: false,
        }
    }
}

fn push_unique(reasons: &mut Vec<String>, reason: &str) {
    if !reasons.iter().any(|r| r == reason) {
        reasons.push(reason.to_string());
    }
}
