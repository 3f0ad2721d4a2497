// Moderation lifecycle tests — gate, decisions, appeals, and the audit log
// composed over an in-memory SQLite store with the deterministic heuristic
// scorer. No network, no filesystem.

use std::sync::Arc;

use rusqlite::Connection;

use palisade::config::HoldPolicy;
use palisade::db::models::{Actor, AppealStatus, ContentKind, ModerationStatus};
use palisade::db::{Database, SqliteDatabase};
use palisade::error::ModerationError;
use palisade::moderation::{
    AppealWorkflow, GateOutcome, GatePolicy, ModerationGate, ModerationQueryService,
    ModeratorDecision,
};
use palisade::scoring::policy::PolicyTable;
use palisade::scoring::ContentScorer;

struct Fixture {
    db: Arc<dyn Database>,
    gate: ModerationGate,
    appeals: AppealWorkflow,
    decisions: ModeratorDecision,
    queries: ModerationQueryService,
}

fn fixture_with_policy(policy: GatePolicy) -> Fixture {
    let conn = Connection::open_in_memory().unwrap();
    palisade::db::schema::create_tables(&conn).unwrap();
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::new(conn));
    let scorer = Arc::new(ContentScorer::heuristic_only(PolicyTable::default()));
    Fixture {
        gate: ModerationGate::new(db.clone(), scorer, policy),
        appeals: AppealWorkflow::new(db.clone()),
        decisions: ModeratorDecision::new(db.clone(), policy),
        queries: ModerationQueryService::new(db.clone()),
        db,
    }
}

fn fixture() -> Fixture {
    fixture_with_policy(GatePolicy::default())
}

const CLEAN: &str = "Lovely weather for a bike ride today";
const TOXIC: &str = "I hate you, idiot";

#[tokio::test]
async fn clean_submission_publishes_with_one_audit_entry() {
    let f = fixture();

    let decision = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap();

    assert_eq!(decision.outcome, GateOutcome::Published);
    assert_eq!(decision.status, ModerationStatus::Approved);
    assert!(decision.visible);
    assert!(!decision.score.degraded);

    let item = decision.item.unwrap();
    assert!(item.is_visible);
    assert_eq!(item.version, 1);

    let trail = f.queries.audit_trail(&item.id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].actor, Actor::System);
    assert_eq!(trail[0].status, ModerationStatus::Approved);
}

#[tokio::test]
async fn toxic_submission_is_held_and_queued() {
    let f = fixture();

    let decision = f
        .gate
        .evaluate_new("alice", ContentKind::Comment, TOXIC)
        .await
        .unwrap();

    assert_eq!(decision.outcome, GateOutcome::Held);
    assert_eq!(decision.status, ModerationStatus::UnderReview);
    assert!(!decision.visible);
    let item = decision.item.unwrap();

    let queue = f.queries.review_queue(None, None).await.unwrap();
    assert_eq!(queue.pagination.total, 1);
    assert_eq!(queue.items[0].id, item.id);

    // Held items never show in the visible feed
    let feed = f.queries.visible_items(None, None).await.unwrap();
    assert_eq!(feed.pagination.total, 0);

    // The hold entry carries the triggering score
    let trail = f.queries.audit_trail(&item.id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert!(trail[0].confidence.unwrap() >= 0.7);
    assert!(!trail[0].reasons.is_empty());
}

#[tokio::test]
async fn full_lifecycle_reject_appeal_approve() {
    let f = fixture();

    let held = f
        .gate
        .evaluate_new("alice", ContentKind::Post, TOXIC)
        .await
        .unwrap()
        .item
        .unwrap();

    // Moderator rejects
    let rejected = f
        .decisions
        .decide(
            &held.id,
            "mod-1",
            palisade::moderation::DecisionAction::Reject,
            None,
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, ModerationStatus::Rejected);
    assert!(!rejected.is_visible);
    assert_eq!(rejected.version, 2);

    // Owner appeals
    let appealed = f
        .appeals
        .submit(&held.id, "alice", "Context was missing, this was a quote")
        .await
        .unwrap();
    assert_eq!(appealed.status, ModerationStatus::UnderReview);
    let appeal = appealed.appeal.clone().unwrap();
    assert_eq!(appeal.status, AppealStatus::Pending);

    // It is back in the queue
    let queue = f.queries.review_queue(None, None).await.unwrap();
    assert_eq!(queue.pagination.total, 1);

    // Moderator approves on second look; the appeal settles in the same write
    let approved = f
        .decisions
        .decide(
            &held.id,
            "mod-2",
            palisade::moderation::DecisionAction::Approve,
            Some("Quoted speech, not the author's own words"),
        )
        .await
        .unwrap();
    assert_eq!(approved.status, ModerationStatus::Approved);
    assert!(approved.is_visible);
    let appeal = approved.appeal.unwrap();
    assert_eq!(appeal.status, AppealStatus::Approved);
    assert_eq!(appeal.reviewed_by.as_deref(), Some("mod-2"));
    assert!(appeal.review_notes.is_some());

    // History: hold, reject, appeal, approve — in append order
    let trail = f.queries.audit_trail(&held.id).await.unwrap();
    assert_eq!(trail.len(), 4);
    assert!(trail.windows(2).all(|w| w[0].seq < w[1].seq));
    assert_eq!(trail[1].actor, Actor::Moderator("mod-1".to_string()));
    assert_eq!(trail[2].actor, Actor::Owner("alice".to_string()));
    assert_eq!(trail[3].status, ModerationStatus::Approved);
}

#[tokio::test]
async fn appeal_guards() {
    let f = fixture();

    let approved = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap()
        .item
        .unwrap();

    // Appealing a non-rejected item is a workflow violation
    let err = f
        .appeals
        .submit(&approved.id, "alice", "why was this held")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::PreconditionFailed(_)));

    // Set up a rejected item
    let held = f
        .gate
        .evaluate_new("bob", ContentKind::Post, TOXIC)
        .await
        .unwrap()
        .item
        .unwrap();
    f.decisions
        .decide(
            &held.id,
            "mod-1",
            palisade::moderation::DecisionAction::Reject,
            None,
        )
        .await
        .unwrap();

    // Only the owner may appeal
    let err = f
        .appeals
        .submit(&held.id, "mallory", "not even my post")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Authorization(_)));

    // Second appeal while one is pending is refused, with no side effects
    f.appeals.submit(&held.id, "bob", "please reconsider").await.unwrap();
    let before = f.queries.audit_trail(&held.id).await.unwrap().len();
    let err = f
        .appeals
        .submit(&held.id, "bob", "asking again")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::PreconditionFailed(_)));

    let current = f.db.get_content(&held.id).await.unwrap().unwrap();
    assert_eq!(current.status, ModerationStatus::UnderReview);
    assert_eq!(
        f.queries.audit_trail(&held.id).await.unwrap().len(),
        before
    );
}

#[tokio::test]
async fn toxic_edit_pulls_approved_item_back_under_review() {
    let f = fixture();

    let item = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap()
        .item
        .unwrap();

    let decision = f.gate.evaluate_edit(&item.id, "alice", TOXIC).await.unwrap();
    assert_eq!(decision.outcome, GateOutcome::Held);
    let updated = decision.item.unwrap();
    assert_eq!(updated.status, ModerationStatus::UnderReview);
    assert!(!updated.is_visible);
    assert_eq!(updated.version, 2);

    // Hold adds exactly one entry on top of the creation entry
    let trail = f.queries.audit_trail(&item.id).await.unwrap();
    assert_eq!(trail.len(), 2);
}

#[tokio::test]
async fn clean_edit_keeps_status_and_writes_no_audit_entry() {
    let f = fixture();

    let item = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap()
        .item
        .unwrap();

    let decision = f
        .gate
        .evaluate_edit(&item.id, "alice", "Still lovely weather, now with sunshine")
        .await
        .unwrap();
    assert!(decision.audit_entry_id.is_none());
    let updated = decision.item.unwrap();
    assert_eq!(updated.status, ModerationStatus::Approved);
    assert_eq!(updated.version, 2);

    let trail = f.queries.audit_trail(&item.id).await.unwrap();
    assert_eq!(trail.len(), 1);
}

#[tokio::test]
async fn edit_guards() {
    let f = fixture();

    let item = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap()
        .item
        .unwrap();

    // Non-owner cannot edit
    let err = f
        .gate
        .evaluate_edit(&item.id, "mallory", "hijacked")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Authorization(_)));

    // Rejected content cannot be edited, only appealed
    let held = f
        .gate
        .evaluate_new("bob", ContentKind::Post, TOXIC)
        .await
        .unwrap()
        .item
        .unwrap();
    f.decisions
        .decide(
            &held.id,
            "mod-1",
            palisade::moderation::DecisionAction::Reject,
            None,
        )
        .await
        .unwrap();
    let err = f
        .gate
        .evaluate_edit(&held.id, "bob", CLEAN)
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::PreconditionFailed(_)));

    // Unknown item
    let err = f
        .gate
        .evaluate_edit("no-such-id", "alice", CLEAN)
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound(_)));
}

#[tokio::test]
async fn decide_guards() {
    let f = fixture();

    let approved = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap()
        .item
        .unwrap();

    // Deciding an item that is not under review is a workflow violation
    let err = f
        .decisions
        .decide(
            &approved.id,
            "mod-1",
            palisade::moderation::DecisionAction::Reject,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::PreconditionFailed(_)));

    let err = f
        .decisions
        .decide(
            "no-such-id",
            "mod-1",
            palisade::moderation::DecisionAction::Approve,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound(_)));
}

#[tokio::test]
async fn stale_version_write_is_a_conflict() {
    let f = fixture();

    let item = f
        .gate
        .evaluate_new("alice", ContentKind::Post, TOXIC)
        .await
        .unwrap()
        .item
        .unwrap();

    // Simulate a concurrent writer bumping the version out from under us
    let mut sidechannel = item.clone();
    sidechannel.text = "edited elsewhere".to_string();
    f.db.apply_transition(&sidechannel, item.version, None)
        .await
        .unwrap();

    // A decision computed against the stale read loses the race
    let mut stale = item.clone();
    stale.status = ModerationStatus::Approved;
    let outcome = f
        .db
        .apply_transition(&stale, item.version, None)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        palisade::db::TransitionOutcome::VersionMismatch
    ));

    // The surviving row is the concurrent writer's
    let current = f.db.get_content(&item.id).await.unwrap().unwrap();
    assert_eq!(current.text, "edited elsewhere");
    assert_eq!(current.version, 2);
}

#[tokio::test]
async fn hard_hold_policy_blocks_without_persisting() {
    let f = fixture_with_policy(GatePolicy {
        hold: HoldPolicy::Hard,
        pending_visible: false,
    });

    let decision = f
        .gate
        .evaluate_new("alice", ContentKind::Post, TOXIC)
        .await
        .unwrap();

    assert_eq!(decision.outcome, GateOutcome::Blocked);
    assert!(decision.item.is_none());
    assert!(decision.audit_entry_id.is_none());

    let stats = f.queries.stats().await.unwrap();
    assert_eq!(stats.total_items, 0);

    // Clean content still goes straight through under the hard policy
    let decision = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap();
    assert_eq!(decision.outcome, GateOutcome::Published);
}

#[tokio::test]
async fn stats_report_counts_and_percentages() {
    let f = fixture();

    for _ in 0..3 {
        f.gate
            .evaluate_new("alice", ContentKind::Post, CLEAN)
            .await
            .unwrap();
    }
    let held = f
        .gate
        .evaluate_new("bob", ContentKind::Post, TOXIC)
        .await
        .unwrap()
        .item
        .unwrap();
    f.decisions
        .decide(
            &held.id,
            "mod-1",
            palisade::moderation::DecisionAction::Reject,
            None,
        )
        .await
        .unwrap();

    let stats = f.queries.stats().await.unwrap();
    assert_eq!(stats.total_items, 4);
    assert_eq!(stats.approved.count, 3);
    assert_eq!(stats.approved.percentage, 75);
    assert_eq!(stats.rejected.count, 1);
    assert_eq!(stats.rejected.percentage, 25);
    assert_eq!(stats.pending_review, 0);
    assert_eq!(stats.pending_appeals, 0);
}

#[tokio::test]
async fn delete_cascades_to_audit_history() {
    let f = fixture();

    let item = f
        .gate
        .evaluate_new("alice", ContentKind::Post, CLEAN)
        .await
        .unwrap()
        .item
        .unwrap();

    assert!(f.db.delete_content(&item.id).await.unwrap());
    assert!(f.db.get_content(&item.id).await.unwrap().is_none());

    // History for a deleted item is gone, and the query layer says NotFound
    let err = f.queries.audit_trail(&item.id).await.unwrap_err();
    assert!(matches!(err, ModerationError::NotFound(_)));
}
