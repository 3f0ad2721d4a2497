// ModerationGate — the checkpoint every creation and edit passes through.
//
// The gate composes scorer -> state machine -> atomic persist and is the only
// component allowed to make the initial pending -> approved|under_review move.
// Scorer trouble never fails the gate: only an explicit toxic verdict can
// hold content.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, HoldPolicy};
use crate::db::models::{
    Actor, ContentItem, ContentKind, ModerationStatus, NewAuditEntry, ScoreSnapshot,
};
use crate::db::{Database, TransitionOutcome};
use crate::error::ModerationError;
use crate::moderation::state::{next_status, ModerationEvent};
use crate::scoring::{ContentScorer, ScoreResult};

/// Maximum accepted body length, in characters.
pub const MAX_TEXT_CHARS: usize = 2000;

const HELD_MESSAGE: &str = "Your content is under review by our moderation team";
const BLOCKED_MESSAGE: &str = "Content blocked by moderation for violating community guidelines";
const PUBLISHED_MESSAGE: &str = "Content created successfully";

/// Gate-level policy knobs, loaded once from configuration.
#[derive(Debug, Clone, Copy)]
pub struct GatePolicy {
    pub hold: HoldPolicy,
    /// "Soft visibility during review": pending items count as visible
    pub pending_visible: bool,
}

impl GatePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            hold: config.hold_policy,
            pending_visible: config.pending_visible,
        }
    }

    /// The visibility an item's status implies under this policy.
    pub fn visibility(&self, status: ModerationStatus) -> bool {
        match status {
            ModerationStatus::Approved => true,
            ModerationStatus::Pending => self.pending_visible,
            ModerationStatus::Rejected | ModerationStatus::UnderReview => false,
        }
    }
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            hold: HoldPolicy::Soft,
            pending_visible: false,
        }
    }
}

/// What happened to the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    /// Persisted and visible
    Published,
    /// Persisted but held for moderator review
    Held,
    /// Refused outright (hard hold policy only); nothing persisted
    Blocked,
}

/// The gate's verdict, returned synchronously to the caller.
#[derive(Debug, Clone)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    /// For blocked submissions this is Rejected even though no item exists
    pub status: ModerationStatus,
    pub visible: bool,
    /// Absent only for blocked submissions
    pub item: Option<ContentItem>,
    /// Absent when no audit entry was written (blocked, or no-op edit)
    pub audit_entry_id: Option<String>,
    pub score: ScoreResult,
    /// User-facing explanation, suitable for the HTTP response
    pub message: String,
}

pub struct ModerationGate {
    db: Arc<dyn Database>,
    scorer: Arc<ContentScorer>,
    policy: GatePolicy,
}

impl ModerationGate {
    pub fn new(db: Arc<dyn Database>, scorer: Arc<ContentScorer>, policy: GatePolicy) -> Self {
        Self { db, scorer, policy }
    }

    /// Evaluate a brand-new submission. This is the only place the initial
    /// pending -> approved|under_review transition happens.
    pub async fn evaluate_new(
        &self,
        owner_id: &str,
        kind: ContentKind,
        text: &str,
    ) -> Result<GateDecision, ModerationError> {
        validate_text(text)?;

        let score = self.scorer.score(text).await;
        let status = next_status(
            ModerationStatus::Pending,
            ModerationEvent::Scored {
                toxic: score.is_toxic,
            },
        )
        .map_err(|e| ModerationError::PreconditionFailed(e.to_string()))?;

        if score.is_toxic && self.policy.hold == HoldPolicy::Hard {
            info!(
                owner_id,
                confidence = score.confidence,
                "Hard hold policy blocked a submission"
            );
            // Nothing is persisted. Rejected here is the caller-facing
            // verdict only; no stored item or audit history carries it.
            return Ok(GateDecision {
                outcome: GateOutcome::Blocked,
                status: ModerationStatus::Rejected,
                visible: false,
                item: None,
                audit_entry_id: None,
                score,
                message: BLOCKED_MESSAGE.to_string(),
            });
        }

        let now = Utc::now().to_rfc3339();
        let item = ContentItem {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            text: text.to_string(),
            status,
            is_visible: self.policy.visibility(status),
            version: 1,
            snapshot: Some(snapshot_from(&score)),
            appeal: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let entry = scoring_entry(status, &score);
        let entry_id = entry.entry_id.clone();
        self.db
            .insert_content(&item, std::slice::from_ref(&entry))
            .await?;

        if status == ModerationStatus::UnderReview {
            info!(item_id = %item.id, "Content held for moderation review");
        }

        Ok(self.decision(status, Some(item), Some(entry_id), score))
    }

    /// Re-evaluate an owner edit. Mirrors the create path: a toxic edit moves
    /// an approved item back to under_review; an edit while held keeps the
    /// hold regardless of the new score.
    pub async fn evaluate_edit(
        &self,
        item_id: &str,
        caller_id: &str,
        new_text: &str,
    ) -> Result<GateDecision, ModerationError> {
        validate_text(new_text)?;

        let item = self
            .db
            .get_content(item_id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("content {item_id} not found")))?;

        if item.owner_id != caller_id {
            return Err(ModerationError::Authorization(
                "only the content owner may edit this item".to_string(),
            ));
        }
        if item.status == ModerationStatus::Rejected {
            return Err(ModerationError::PreconditionFailed(
                "rejected content cannot be edited; submit an appeal instead".to_string(),
            ));
        }

        let score = self.scorer.score(new_text).await;
        let new_status = next_status(
            item.status,
            ModerationEvent::Scored {
                toxic: score.is_toxic,
            },
        )
        .map_err(|e| ModerationError::PreconditionFailed(e.to_string()))?;

        let mut updated = item.clone();
        updated.text = new_text.to_string();
        updated.status = new_status;
        updated.is_visible = self.policy.visibility(new_status);
        updated.snapshot = Some(snapshot_from(&score));

        // A status change commits with exactly one audit entry; an edit that
        // leaves the status alone writes none.
        let entry = (new_status != item.status).then(|| scoring_entry(new_status, &score));
        let entry_id = entry.as_ref().map(|e| e.entry_id.clone());

        match self
            .db
            .apply_transition(&updated, item.version, entry.as_ref())
            .await?
        {
            TransitionOutcome::Applied(after) => {
                Ok(self.decision(new_status, Some(after), entry_id, score))
            }
            TransitionOutcome::VersionMismatch => Err(ModerationError::Conflict(
                "content was modified concurrently; re-read and retry".to_string(),
            )),
            TransitionOutcome::Missing => Err(ModerationError::NotFound(format!(
                "content {item_id} not found"
            ))),
        }
    }

    fn decision(
        &self,
        status: ModerationStatus,
        item: Option<ContentItem>,
        audit_entry_id: Option<String>,
        score: ScoreResult,
    ) -> GateDecision {
        let outcome = if status == ModerationStatus::UnderReview {
            GateOutcome::Held
        } else {
            GateOutcome::Published
        };
        GateDecision {
            outcome,
            status,
            visible: self.policy.visibility(status),
            item,
            audit_entry_id,
            score,
            message: match outcome {
                GateOutcome::Held => HELD_MESSAGE.to_string(),
                _ => PUBLISHED_MESSAGE.to_string(),
            },
        }
    }
}

fn validate_text(text: &str) -> Result<(), ModerationError> {
    if text.trim().is_empty() {
        return Err(ModerationError::Validation(
            "text must not be empty".to_string(),
        ));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ModerationError::Validation(format!(
            "text must be at most {MAX_TEXT_CHARS} characters"
        )));
    }
    Ok(())
}

fn snapshot_from(score: &ScoreResult) -> ScoreSnapshot {
    ScoreSnapshot {
        is_toxic: score.is_toxic,
        confidence: score.confidence,
        reasons: score.reasons.clone(),
        provider_id: score.provider_id.clone(),
        scored_at: score.scored_at.to_rfc3339(),
    }
}

/// Audit entry for an automated (gate) transition.
fn scoring_entry(status: ModerationStatus, score: &ScoreResult) -> NewAuditEntry {
    let (prefix, reason) = if score.is_toxic {
        ("review", "Auto-flagged content requiring review")
    } else {
        ("mod", "Auto-approved by content scoring")
    };
    NewAuditEntry::new(prefix, status, reason.to_string(), Actor::System)
        .with_score(score.confidence, score.reasons.clone())
}
