// ContentScorer — the two-stage scoring strategy.
//
// Primary provider (if configured) under a hard timeout and a circuit
// breaker; deterministic heuristic fallback otherwise. score() is infallible
// by contract: every failure mode degrades to the heuristic, and the only
// trace a caller sees is the `degraded` flag on the result.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::{Config, ScorerBackend};

use super::breaker::CircuitBreaker;
use super::heuristic::HeuristicScorer;
use super::perspective::PerspectiveScorer;
use super::policy::PolicyTable;
use super::traits::{verdict, ProviderScorer, ScoreResult};

/// Consecutive provider failures before the breaker opens.
const BREAKER_THRESHOLD: u32 = 3;
/// How long the breaker stays open before probing the provider again.
const BREAKER_COOLDOWN: Duration = Duration::from_secs(60);

pub struct ContentScorer {
    primary: Option<Box<dyn ProviderScorer>>,
    fallback: HeuristicScorer,
    timeout: Duration,
    breaker: CircuitBreaker,
}

impl ContentScorer {
    /// Build the scorer the configuration asks for. The Perspective backend
    /// requires an API key; the heuristic backend always works.
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = match &config.policy_path {
            Some(path) => PolicyTable::load(path)?,
            None => PolicyTable::default(),
        };

        let primary: Option<Box<dyn ProviderScorer>> = match config.scorer_backend {
            ScorerBackend::Perspective => {
                config.require_provider()?;
                Some(Box::new(PerspectiveScorer::new(
                    config.moderation_api_key.clone(),
                )))
            }
            ScorerBackend::Heuristic => None,
        };

        Ok(Self {
            primary,
            fallback: HeuristicScorer::new(policy),
            timeout: config.provider_timeout,
            breaker: CircuitBreaker::new(BREAKER_THRESHOLD, BREAKER_COOLDOWN),
        })
    }

    /// Heuristic-only scorer with an explicit policy table. Used by tests
    /// and by deployments that never configure a provider.
    pub fn heuristic_only(policy: PolicyTable) -> Self {
        Self {
            primary: None,
            fallback: HeuristicScorer::new(policy),
            timeout: Duration::from_secs(5),
            breaker: CircuitBreaker::new(BREAKER_THRESHOLD, BREAKER_COOLDOWN),
        }
    }

    /// Score a text. Never fails: provider errors, timeouts and an open
    /// breaker all degrade to the heuristic path.
    pub async fn score(&self, text: &str) -> ScoreResult {
        let primary = match &self.primary {
            Some(p) => p,
            None => {
                // Heuristic-only is the configured mode, not degradation
                debug!("No primary provider configured; scoring heuristically");
                return self.fallback.score(text);
            }
        };

        if self.breaker.is_open().await {
            warn!(provider = primary.provider_id(), "Circuit breaker open; degrading to heuristic");
            let mut result = self.fallback.score(text);
            result.degraded = true;
            return result;
        }

        match tokio::time::timeout(self.timeout, primary.category_scores(text)).await {
            Ok(Ok(scores)) => {
                self.breaker.record_success().await;
                let (is_toxic, confidence, reasons) = verdict(&scores);
                ScoreResult {
                    is_toxic,
                    confidence,
                    reasons,
                    provider_id: primary.provider_id().to_string(),
                    scored_at: chrono::Utc::now(),
                    degraded: false,
                }
            }
            Ok(Err(e)) => {
                self.breaker.record_failure().await;
                warn!(provider = primary.provider_id(), error = %e, "Provider failed; degrading to heuristic");
                let mut result = self.fallback.score(text);
                result.degraded = true;
                result
            }
            Err(_) => {
                self.breaker.record_failure().await;
                warn!(
                    provider = primary.provider_id(),
                    timeout_secs = self.timeout.as_secs(),
                    "Provider timed out; degrading to heuristic"
                );
                let mut result = self.fallback.score(text);
                result.degraded = true;
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::traits::CategoryScores;
    use async_trait::async_trait;

    struct FailingProvider;

    #[async_trait]
    impl ProviderScorer for FailingProvider {
        async fn category_scores(&self, _text: &str) -> Result<CategoryScores> {
            anyhow::bail!("provider down")
        }
        fn provider_id(&self) -> &'static str {
            "failing"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl ProviderScorer for SlowProvider {
        async fn category_scores(&self, _text: &str) -> Result<CategoryScores> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(CategoryScores::default())
        }
        fn provider_id(&self) -> &'static str {
            "slow"
        }
    }

    struct ToxicProvider;

    #[async_trait]
    impl ProviderScorer for ToxicProvider {
        async fn category_scores(&self, _text: &str) -> Result<CategoryScores> {
            Ok(CategoryScores {
                threat: 0.92,
                toxicity: 0.8,
                ..Default::default()
            })
        }
        fn provider_id(&self) -> &'static str {
            "canned"
        }
    }

    fn with_primary(p: Box<dyn ProviderScorer>, timeout: Duration) -> ContentScorer {
        ContentScorer {
            primary: Some(p),
            fallback: HeuristicScorer::new(PolicyTable::default()),
            timeout,
            breaker: CircuitBreaker::new(BREAKER_THRESHOLD, BREAKER_COOLDOWN),
        }
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_heuristic() {
        let scorer = with_primary(Box::new(FailingProvider), Duration::from_secs(5));
        let result = scorer.score("I hate you, idiot").await;
        assert!(result.degraded);
        assert_eq!(result.provider_id, "heuristic-v1");
        assert!(result.is_toxic);
    }

    #[tokio::test]
    async fn provider_timeout_degrades_to_heuristic() {
        let scorer = with_primary(Box::new(SlowProvider), Duration::from_millis(20));
        let result = scorer.score("Hello world, nice day").await;
        assert!(result.degraded);
        assert!(!result.is_toxic);
    }

    #[tokio::test]
    async fn healthy_provider_result_is_not_degraded() {
        let scorer = with_primary(Box::new(ToxicProvider), Duration::from_secs(5));
        let result = scorer.score("anything").await;
        assert!(!result.degraded);
        assert_eq!(result.provider_id, "canned");
        assert!(result.is_toxic);
        assert_eq!(result.reasons[0], "Threat detected");
        assert!((result.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn no_provider_is_not_degraded() {
        let scorer = ContentScorer::heuristic_only(PolicyTable::default());
        let result = scorer.score("Hello world, nice day").await;
        assert!(!result.degraded);
        assert_eq!(result.provider_id, "heuristic-v1");
    }

    #[tokio::test]
    async fn repeated_failures_open_the_breaker() {
        let scorer = with_primary(Box::new(FailingProvider), Duration::from_secs(5));
        for _ in 0..BREAKER_THRESHOLD {
            scorer.score("text").await;
        }
        assert!(scorer.breaker.is_open().await);
        // Still answers, still degraded
        let result = scorer.score("I hate you, idiot").await;
        assert!(result.degraded);
        assert!(result.is_toxic);
    }
}
