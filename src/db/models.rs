// Data models — Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a content item's visibility decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    UnderReview,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
            ModerationStatus::UnderReview => "under_review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ModerationStatus::Pending),
            "approved" => Some(ModerationStatus::Approved),
            "rejected" => Some(ModerationStatus::Rejected),
            "under_review" => Some(ModerationStatus::UnderReview),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Posts and comments are moderated identically; the kind is carried for
/// the surrounding app's benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Comment,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(ContentKind::Post),
            "comment" => Some(ContentKind::Comment),
            _ => None,
        }
    }
}

/// Who performed a moderation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Actor {
    System,
    Moderator(String),
    Owner(String),
}

impl Actor {
    /// Stable single-column encoding used in the audit_log table.
    pub fn encode(&self) -> String {
        match self {
            Actor::System => "system".to_string(),
            Actor::Moderator(id) => format!("moderator:{id}"),
            Actor::Owner(id) => format!("owner:{id}"),
        }
    }

    pub fn decode(s: &str) -> Self {
        if let Some(id) = s.strip_prefix("moderator:") {
            Actor::Moderator(id.to_string())
        } else if let Some(id) = s.strip_prefix("owner:") {
            Actor::Owner(id.to_string())
        } else {
            Actor::System
        }
    }
}

/// State of an owner-initiated appeal. Absence of an Appeal record means "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealStatus {
    Pending,
    Approved,
    Rejected,
}

impl AppealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppealStatus::Pending => "pending",
            AppealStatus::Approved => "approved",
            AppealStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppealStatus::Pending),
            "approved" => Some(AppealStatus::Approved),
            "rejected" => Some(AppealStatus::Rejected),
            _ => None,
        }
    }
}

/// The last automated score for an item. Overwritten on each scoring pass;
/// history lives in the audit log, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub is_toxic: bool,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub provider_id: String,
    pub scored_at: String,
}

/// An owner's request to reconsider a rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appeal {
    pub status: AppealStatus,
    pub reason: String,
    pub submitted_at: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub review_notes: Option<String>,
}

/// A moderated content item (post or comment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub owner_id: String,
    pub kind: ContentKind,
    pub text: String,
    pub status: ModerationStatus,
    pub is_visible: bool,
    /// Optimistic-concurrency counter; every write checks and increments it
    pub version: i64,
    pub snapshot: Option<ScoreSnapshot>,
    pub appeal: Option<Appeal>,
    pub created_at: String,
    pub updated_at: String,
}

/// One immutable record of a status change, as read back from the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Append order within the log (DB-assigned, monotonically increasing)
    pub seq: i64,
    pub entry_id: String,
    pub item_id: String,
    pub status: ModerationStatus,
    pub reason: String,
    pub actor: Actor,
    pub confidence: Option<f64>,
    pub reasons: Vec<String>,
    pub created_at: String,
}

/// An audit entry about to be appended (seq and created_at are DB-assigned).
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub entry_id: String,
    pub status: ModerationStatus,
    pub reason: String,
    pub actor: Actor,
    pub confidence: Option<f64>,
    pub reasons: Vec<String>,
}

impl NewAuditEntry {
    pub fn new(prefix: &str, status: ModerationStatus, reason: String, actor: Actor) -> Self {
        Self {
            entry_id: format!("{prefix}-{}", uuid::Uuid::new_v4()),
            status,
            reason,
            actor,
            confidence: None,
            reasons: Vec::new(),
        }
    }

    /// Carry confidence and reasons from the triggering score.
    pub fn with_score(mut self, confidence: f64, reasons: Vec<String>) -> Self {
        self.confidence = Some(confidence);
        self.reasons = reasons;
        self
    }
}

/// Aggregate counts for the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationStats {
    pub total_items: i64,
    pub approved: i64,
    pub rejected: i64,
    pub pending_review: i64,
    pub pending_appeals: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ModerationStatus::Pending,
            ModerationStatus::Approved,
            ModerationStatus::Rejected,
            ModerationStatus::UnderReview,
        ] {
            assert_eq!(ModerationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ModerationStatus::parse("bogus"), None);
    }

    #[test]
    fn actor_round_trips_through_encoding() {
        for actor in [
            Actor::System,
            Actor::Moderator("mod-1".to_string()),
            Actor::Owner("user-7".to_string()),
        ] {
            assert_eq!(Actor::decode(&actor.encode()), actor);
        }
    }

    #[test]
    fn new_audit_entry_ids_are_unique() {
        let a = NewAuditEntry::new("mod", ModerationStatus::Approved, "r".into(), Actor::System);
        let b = NewAuditEntry::new("mod", ModerationStatus::Approved, "r".into(), Actor::System);
        assert_ne!(a.entry_id, b.entry_id);
        assert!(a.entry_id.starts_with("mod-"));
    }
}
