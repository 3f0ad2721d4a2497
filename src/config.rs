use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Which toxicity scoring backend to use for the primary pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerBackend {
    /// Local heuristic word lists (default) — no API key, fully deterministic
    Heuristic,
    /// Google Perspective API — requires MODERATION_API_KEY
    Perspective,
}

/// What the gate does with content that scores toxic at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPolicy {
    /// Persist the item with status under_review; hidden until approved
    Soft,
    /// Refuse to persist; the caller gets a blocked response
    Hard,
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    pub db_path: String,
    /// Perspective API key; empty means the heuristic handles everything
    pub moderation_api_key: String,
    pub scorer_backend: ScorerBackend,
    /// Hard budget for one provider call; the fallback runs on expiry
    pub provider_timeout: Duration,
    pub hold_policy: HoldPolicy,
    /// When true, pending items count as visible ("soft visibility during review")
    pub pending_visible: bool,
    /// Optional JSON file overriding the built-in category word lists
    pub policy_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default — an empty environment yields a working
    /// heuristic-only pipeline with a local SQLite file.
    pub fn load() -> Result<Self> {
        let scorer_backend = match env::var("PALISADE_SCORER").as_deref() {
            Ok("perspective") => ScorerBackend::Perspective,
            // "heuristic" or unset both default to the local scorer
            _ => ScorerBackend::Heuristic,
        };

        let hold_policy = match env::var("PALISADE_HOLD_POLICY").as_deref() {
            Ok("hard") => HoldPolicy::Hard,
            _ => HoldPolicy::Soft,
        };

        let timeout_secs = env::var("PALISADE_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);

        Ok(Self {
            db_path: env::var("PALISADE_DB_PATH").unwrap_or_else(|_| "./palisade.db".to_string()),
            moderation_api_key: env::var("MODERATION_API_KEY").unwrap_or_default(),
            scorer_backend,
            provider_timeout: Duration::from_secs(timeout_secs),
            hold_policy,
            pending_visible: env::var("PALISADE_PENDING_VISIBLE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            policy_path: env::var("PALISADE_POLICY_PATH").ok().map(PathBuf::from),
        })
    }

    /// Check that the Perspective API key is configured.
    /// Call this before selecting the Perspective backend.
    pub fn require_provider(&self) -> Result<()> {
        if self.moderation_api_key.is_empty() {
            anyhow::bail!(
                "MODERATION_API_KEY not set. Add it to your .env file,\n\
                 or set PALISADE_SCORER=heuristic to run without a provider."
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_provider_fails_without_key() {
        let config = Config {
            db_path: String::new(),
            moderation_api_key: String::new(),
            scorer_backend: ScorerBackend::Perspective,
            provider_timeout: Duration::from_secs(5),
            hold_policy: HoldPolicy::Soft,
            pending_visible: false,
            policy_path: None,
        };
        assert!(config.require_provider().is_err());
    }
}
