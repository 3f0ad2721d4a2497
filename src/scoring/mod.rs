// Scoring subsystem — toxicity assessment for submitted text.
//
// The primary provider (Perspective API) runs under a timeout and a circuit
// breaker; any failure degrades to the deterministic local heuristic.

pub mod breaker;
pub mod heuristic;
pub mod pacing;
pub mod perspective;
pub mod policy;
pub mod scorer;
pub mod traits;

pub use scorer::ContentScorer;
pub use traits::{CategoryScores, ScoreResult, TOXIC_THRESHOLD};
