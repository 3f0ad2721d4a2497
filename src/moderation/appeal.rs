// AppealWorkflow — owner-initiated reconsideration of a rejection.
//
// Submitting an appeal moves the item rejected -> under_review and attaches
// a pending Appeal record. The moderator's eventual decision (decide.rs)
// resolves the appeal in the same write that settles the item.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::db::models::{Actor, Appeal, AppealStatus, ContentItem, NewAuditEntry};
use crate::db::{Database, TransitionOutcome};
use crate::error::ModerationError;
use crate::moderation::state::{next_status, ModerationEvent};

/// Maximum accepted appeal reason length, in characters.
pub const MAX_APPEAL_REASON_CHARS: usize = 500;

pub struct AppealWorkflow {
    db: Arc<dyn Database>,
}

impl AppealWorkflow {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Submit an appeal against a rejected item. Only the owner may appeal,
    /// only rejected items are appealable, and at most one appeal can be
    /// pending at a time.
    pub async fn submit(
        &self,
        item_id: &str,
        caller_id: &str,
        reason: &str,
    ) -> Result<ContentItem, ModerationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ModerationError::Validation(
                "appeal reason must not be empty".to_string(),
            ));
        }
        if reason.chars().count() > MAX_APPEAL_REASON_CHARS {
            return Err(ModerationError::Validation(format!(
                "appeal reason must be at most {MAX_APPEAL_REASON_CHARS} characters"
            )));
        }

        let item = self
            .db
            .get_content(item_id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("content {item_id} not found")))?;

        if item.owner_id != caller_id {
            return Err(ModerationError::Authorization(
                "only the content owner may appeal this item".to_string(),
            ));
        }
        if matches!(&item.appeal, Some(a) if a.status == AppealStatus::Pending) {
            return Err(ModerationError::PreconditionFailed(
                "an appeal is already pending for this item".to_string(),
            ));
        }

        let new_status = next_status(item.status, ModerationEvent::AppealSubmitted)
            .map_err(|e| ModerationError::PreconditionFailed(e.to_string()))?;

        let mut updated = item.clone();
        updated.status = new_status;
        updated.is_visible = false;
        updated.appeal = Some(Appeal {
            status: AppealStatus::Pending,
            reason: reason.to_string(),
            submitted_at: Utc::now().to_rfc3339(),
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        });

        let mut entry = NewAuditEntry::new(
            "appeal",
            new_status,
            "User appealed moderation decision".to_string(),
            Actor::Owner(caller_id.to_string()),
        );
        entry.reasons = vec![format!("Appeal reason: {reason}")];

        match self
            .db
            .apply_transition(&updated, item.version, Some(&entry))
            .await?
        {
            TransitionOutcome::Applied(after) => {
                info!(item_id, owner_id = caller_id, "Appeal submitted");
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
