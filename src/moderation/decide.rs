// ModeratorDecision — the human verdict on held content.
//
// Approve publishes the item; reject hides it and opens the path to an
// appeal. If a pending appeal exists, the same write resolves it so the
// appeal can never disagree with the item's settled status.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::db::models::{Actor, AppealStatus, ContentItem, NewAuditEntry};
use crate::db::{Database, TransitionOutcome};
use crate::error::ModerationError;
use crate::moderation::gate::GatePolicy;
use crate::moderation::state::{next_status, ModerationEvent};

/// Maximum accepted decision reason length, in characters.
pub const MAX_REASON_CHARS: usize = 500;

const DEFAULT_APPROVE_REASON: &str = "Manually approved by moderator";
const DEFAULT_REJECT_REASON: &str = "Content violates community guidelines";
const DEFAULT_REVIEW_NOTES: &str = "Reviewed by moderator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

pub struct ModeratorDecision {
    db: Arc<dyn Database>,
    policy: GatePolicy,
}

impl ModeratorDecision {
    pub fn new(db: Arc<dyn Database>, policy: GatePolicy) -> Self {
        Self { db, policy }
    }

    /// Settle an item that is under review. Requires moderator identity;
    /// the caller (web auth layer) enforces the role.
    pub async fn decide(
        &self,
        item_id: &str,
        moderator_id: &str,
        action: DecisionAction,
        reason: Option<&str>,
    ) -> Result<ContentItem, ModerationError> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        if let Some(r) = reason {
            if r.chars().count() > MAX_REASON_CHARS {
                return Err(ModerationError::Validation(format!(
                    "decision reason must be at most {MAX_REASON_CHARS} characters"
                )));
            }
        }

        let item = self
            .db
            .get_content(item_id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("content {item_id} not found")))?;

        let approve = action == DecisionAction::Approve;
        let new_status = next_status(item.status, ModerationEvent::Decide { approve })
            .map_err(|e| ModerationError::PreconditionFailed(e.to_string()))?;

        let reason_text = reason
            .unwrap_or(if approve {
                DEFAULT_APPROVE_REASON
            } else {
                DEFAULT_REJECT_REASON
            })
            .to_string();

        let mut updated = item.clone();
        updated.status = new_status;
        updated.is_visible = self.policy.visibility(new_status);
        if let Some(appeal) = updated.appeal.as_mut() {
            if appeal.status == AppealStatus::Pending {
                appeal.status = if approve {
                    AppealStatus::Approved
                } else {
                    AppealStatus::Rejected
                };
                appeal.reviewed_by = Some(moderator_id.to_string());
                appeal.reviewed_at = Some(Utc::now().to_rfc3339());
                appeal.review_notes = Some(
                    reason
                        .map(str::to_string)
                        .unwrap_or_else(|| DEFAULT_REVIEW_NOTES.to_string()),
                );
            }
        }

        let mut entry = NewAuditEntry::new(
            "mod",
            new_status,
            reason_text,
            Actor::Moderator(moderator_id.to_string()),
        );
        // The decision entry carries the score that triggered the hold
        if let Some(snap) = &item.snapshot {
            entry = entry.with_score(snap.confidence, snap.reasons.clone());
        }

        match self
            .db
            .apply_transition(&updated, item.version, Some(&entry))
            .await?
        {
            TransitionOutcome::Applied(after) => {
                info!(
                    item_id,
                    moderator_id,
                    status = %after.status,
                    "Moderation decision recorded"
                );
                Ok(after)
            }
            TransitionOutcome::VersionMismatch => Err(ModerationError::Conflict(
                "content was modified concurrently; re-read and retry".to_string(),
            )),
            TransitionOutcome::Missing => Err(ModerationError::NotFound(format!(
                "content {item_id} not found"
            ))),
        }
    }
}
