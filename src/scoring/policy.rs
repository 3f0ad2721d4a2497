// Policy word lists — injected configuration for the heuristic scorer.
//
// The category keyword lists are explicit data, not hard-coded globals, so
// a deployment can tune policy (PALISADE_POLICY_PATH) without a rebuild and
// tests can pin exact tables.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A heuristic violation category and its user-facing reason string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCategory {
    HateSpeech,
    Harassment,
    Threats,
    SexualHarassment,
}

impl PolicyCategory {
    pub fn reason(&self) -> &'static str {
        match self {
            PolicyCategory::HateSpeech => "Contains hate speech or discriminatory language",
            PolicyCategory::Harassment => "Contains harassment or bullying language",
            PolicyCategory::Threats => "Contains threatening language",
            PolicyCategory::SexualHarassment => "Contains sexually harassing language",
        }
    }
}

/// Category keyword lists matched case-insensitively against submitted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    pub hate_speech: Vec<String>,
    pub harassment: Vec<String>,
    pub threats: Vec<String>,
    pub sexual_harassment: Vec<String>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        // Built-in lists; deployments are expected to extend these via a
        // policy file. Keywords are stored lowercase.
        Self {
            hate_speech: words(&["hate", "bigot", "racist", "sexist"]),
            harassment: words(&["stupid", "idiot", "dumb", "loser", "pathetic", "worthless"]),
            threats: words(&["kill", "die", "hurt you", "beat you", "destroy you"]),
            sexual_harassment: words(&["send nudes", "sexy", "explicit"]),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl PolicyTable {
    /// Load a policy table from a JSON file. Missing categories fall back
    /// to the built-in defaults via #[serde(default)].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file {}", path.display()))?;
        let table: PolicyTable = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse policy file {}", path.display()))?;
        Ok(table)
    }

    /// Iterate (category, keywords) pairs in fixed order.
    pub fn categories(&self) -> [(PolicyCategory, &[String]); 4] {
        [
            (PolicyCategory::HateSpeech, self.hate_speech.as_slice()),
            (PolicyCategory::Harassment, self.harassment.as_slice()),
            (PolicyCategory::Threats, self.threats.as_slice()),
            (
                PolicyCategory::SexualHarassment,
                self.sexual_harassment.as_slice(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_all_categories() {
        let table = PolicyTable::default();
        for (_, keywords) in table.categories() {
            assert!(!keywords.is_empty());
        }
    }

    #[test]
    fn load_merges_with_defaults() {
        let dir = std::env::temp_dir();
        let path = dir.join("palisade_policy_test.json");
        std::fs::write(&path, r#"{"harassment": ["clown"]}"#).unwrap();

        let table = PolicyTable::load(&path).unwrap();
        assert_eq!(table.harassment, vec!["clown"]);
        // Unspecified categories keep the built-in defaults
        assert!(table.threats.contains(&"kill".to_string()));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = std::env::temp_dir();
        let path = dir.join("palisade_policy_bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(PolicyTable::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
