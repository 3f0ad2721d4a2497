// Moderation state machine.
//
// The transition function is total: any (status, event) pair not explicitly
// listed is a PolicyViolation. Callers map that to PreconditionFailed so the
// violator gets an actionable message rather than a silent no-op.

use thiserror::Error;

use crate::db::models::ModerationStatus;

/// Events that can move an item through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationEvent {
    /// Automated score at creation or edit time (gate only)
    Scored { toxic: bool },
    /// Explicit moderator verdict on a held item
    Decide { approve: bool },
    /// Owner contests a rejection
    AppealSubmitted,
}

impl ModerationEvent {
    fn describe(&self) -> &'static str {
        match self {
            ModerationEvent::Scored { .. } => "an automated score",
            ModerationEvent::Decide { .. } => "a moderator decision",
            ModerationEvent::AppealSubmitted => "an appeal",
        }
    }
}

/// An illegal (status, event) combination.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct PolicyViolation(pub String);

/// Compute the status an event moves an item to.
///
/// Legal transitions:
/// - pending      + scored(clean)  -> approved
/// - pending      + scored(toxic)  -> under_review
/// - approved     + scored(clean)  -> approved      (owner edit, still clean)
/// - approved     + scored(toxic)  -> under_review  (owner edit went toxic)
/// - under_review + scored(_)      -> under_review  (edit while held keeps the hold)
/// - under_review + decide         -> approved | rejected
/// - rejected     + appeal         -> under_review
pub fn next_status(
    current: ModerationStatus,
    event: ModerationEvent,
) -> Result<ModerationStatus, PolicyViolation> {
    use ModerationStatus::*;

    match (current, event) {
        (Pending, ModerationEvent::Scored { toxic: false }) => Ok(Approved),
        (Pending, ModerationEvent::Scored { toxic: true }) => Ok(UnderReview),
        (Approved, ModerationEvent::Scored { toxic: false }) => Ok(Approved),
        (Approved, ModerationEvent::Scored { toxic: true }) => Ok(UnderReview),
        (UnderReview, ModerationEvent::Scored { .. }) => Ok(UnderReview),
        (UnderReview, ModerationEvent::Decide { approve: true }) => Ok(Approved),
        (UnderReview, ModerationEvent::Decide { approve: false }) => Ok(Rejected),
        (Rejected, ModerationEvent::AppealSubmitted) => Ok(UnderReview),
        (status, event) => Err(PolicyViolation(format!(
            "cannot apply {} to content with status '{}'",
            event.describe(),
            status
        ))),
    }
}
