// Database queries — synchronous rusqlite functions.
//
// All writes that change an item's status go through apply_transition, which
// does the version-checked UPDATE and the audit INSERT in one transaction.
// There is deliberately no function that updates or deletes audit rows; the
// log only shrinks when the parent item is deleted.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{
    Actor, Appeal, AppealStatus, AuditEntry, ContentItem, ContentKind, ModerationStats,
    ModerationStatus, NewAuditEntry, ScoreSnapshot,
};

/// Result of a version-guarded write.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// The write committed; the re-read item is returned.
    Applied(ContentItem),
    /// A concurrent write bumped the version first. Nothing was written.
    VersionMismatch,
    /// No item with that id exists.
    Missing,
}

const ITEM_COLUMNS: &str = "id, owner_id, kind, text, status, is_visible, version, \
     snap_is_toxic, snap_confidence, snap_reasons, snap_provider_id, snap_scored_at, \
     appeal_status, appeal_reason, appeal_submitted_at, appeal_reviewed_by, \
     appeal_reviewed_at, appeal_review_notes, created_at, updated_at";

/// Insert a new item together with its creation audit entries, atomically.
pub fn insert_content(
    conn: &mut Connection,
    item: &ContentItem,
    audit: &[NewAuditEntry],
) -> Result<()> {
    let tx = conn.transaction()?;

    let (snap_is_toxic, snap_confidence, snap_reasons, snap_provider_id, snap_scored_at) =
        snapshot_columns(item.snapshot.as_ref())?;

    tx.execute(
        "INSERT INTO content_items
            (id, owner_id, kind, text, status, is_visible, version,
             snap_is_toxic, snap_confidence, snap_reasons, snap_provider_id, snap_scored_at,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            item.id,
            item.owner_id,
            item.kind.as_str(),
            item.text,
            item.status.as_str(),
            item.is_visible,
            item.version,
            snap_is_toxic,
            snap_confidence,
            snap_reasons,
            snap_provider_id,
            snap_scored_at,
            item.created_at,
            item.updated_at,
        ],
    )
    .context("Failed to insert content item")?;

    for entry in audit {
        insert_audit(&tx, &item.id, entry)?;
    }

    tx.commit()?;
    Ok(())
}

/// Load one item by id.
pub fn get_content(conn: &Connection, id: &str) -> Result<Option<ContentItem>> {
    let item = conn
        .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM content_items WHERE id = ?1"),
            [id],
            map_item,
        )
        .optional()
        .context("Failed to load content item")?;
    Ok(item)
}

/// Version-checked write of a new item state plus its audit entry.
///
/// The UPDATE only matches when the stored version equals `expected_version`;
/// zero matched rows means either a lost race or a missing item, and nothing
/// (including the audit entry) is committed in that case.
pub fn apply_transition(
    conn: &mut Connection,
    updated: &ContentItem,
    expected_version: i64,
    audit: Option<&NewAuditEntry>,
) -> Result<TransitionOutcome> {
    let tx = conn.transaction()?;
    let now = Utc::now().to_rfc3339();

    let (snap_is_toxic, snap_confidence, snap_reasons, snap_provider_id, snap_scored_at) =
        snapshot_columns(updated.snapshot.as_ref())?;
    let appeal = updated.appeal.as_ref();

    let changed = tx.execute(
        "UPDATE content_items SET
            text = ?1, status = ?2, is_visible = ?3,
            snap_is_toxic = ?4, snap_confidence = ?5, snap_reasons = ?6,
            snap_provider_id = ?7, snap_scored_at = ?8,
            appeal_status = ?9, appeal_reason = ?10, appeal_submitted_at = ?11,
            appeal_reviewed_by = ?12, appeal_reviewed_at = ?13, appeal_review_notes = ?14,
            updated_at = ?15, version = version + 1
         WHERE id = ?16 AND version = ?17",
        params![
            updated.text,
            updated.status.as_str(),
            updated.is_visible,
            snap_is_toxic,
            snap_confidence,
            snap_reasons,
            snap_provider_id,
            snap_scored_at,
            appeal.map(|a| a.status.as_str()),
            appeal.map(|a| a.reason.as_str()),
            appeal.map(|a| a.submitted_at.as_str()),
            appeal.and_then(|a| a.reviewed_by.as_deref()),
            appeal.and_then(|a| a.reviewed_at.as_deref()),
            appeal.and_then(|a| a.review_notes.as_deref()),
            now,
            updated.id,
            expected_version,
        ],
    )
    .context("Failed to update content item")?;

    if changed == 0 {
        let exists: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM content_items WHERE id = ?1",
            [&updated.id],
            |row| row.get(0),
        )?;
        // Dropping the transaction rolls back
        return Ok(if exists {
            TransitionOutcome::VersionMismatch
        } else {
            TransitionOutcome::Missing
        });
    }

    if let Some(entry) = audit {
        insert_audit(&tx, &updated.id, entry)?;
    }

    let item = get_content(&tx, &updated.id)?
        .context("Content item vanished inside its own transaction")?;
    tx.commit()?;
    Ok(TransitionOutcome::Applied(item))
}

/// Items awaiting moderator attention: held for review or carrying a pending
/// appeal. Newest first.
pub fn review_queue(
    conn: &Connection,
    offset: u32,
    limit: u32,
) -> Result<(Vec<ContentItem>, i64)> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM content_items
         WHERE status = 'under_review' OR appeal_status = 'pending'",
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM content_items
         WHERE status = 'under_review' OR appeal_status = 'pending'
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2"
    ))?;
    let items = stmt
        .query_map(params![limit, offset], map_item)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((items, total))
}

/// Externally visible items, newest first.
pub fn visible_items(
    conn: &Connection,
    offset: u32,
    limit: u32,
) -> Result<(Vec<ContentItem>, i64)> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM content_items WHERE is_visible = 1",
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM content_items
         WHERE is_visible = 1
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2"
    ))?;
    let items = stmt
        .query_map(params![limit, offset], map_item)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((items, total))
}

/// Aggregate counts in one pass. Reads are plain SELECTs — concurrent writers
/// only make the counts eventually consistent, never wrong for a point in time.
pub fn moderation_stats(conn: &Connection) -> Result<ModerationStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(status = 'approved'), 0),
                COALESCE(SUM(status = 'rejected'), 0),
                COALESCE(SUM(status = 'under_review'), 0),
                COALESCE(SUM(appeal_status = 'pending'), 0)
         FROM content_items",
        [],
        |row| {
            Ok(ModerationStats {
                total_items: row.get(0)?,
                approved: row.get(1)?,
                rejected: row.get(2)?,
                pending_review: row.get(3)?,
                pending_appeals: row.get(4)?,
            })
        },
    )?;
    Ok(stats)
}

/// Full moderation history for one item, in append order.
pub fn audit_trail(conn: &Connection, item_id: &str) -> Result<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT seq, entry_id, item_id, status, reason, actor, confidence, reasons, created_at
         FROM audit_log WHERE item_id = ?1 ORDER BY seq ASC",
    )?;
    let entries = stmt
        .query_map([item_id], map_audit_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

/// Number of audit entries for one item.
pub fn audit_count(conn: &Connection, item_id: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM audit_log WHERE item_id = ?1",
        [item_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Delete an item and its history (the parent content was deleted).
/// Returns false when no such item existed.
pub fn delete_content(conn: &mut Connection, id: &str) -> Result<bool> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM audit_log WHERE item_id = ?1", [id])?;
    let deleted = tx.execute("DELETE FROM content_items WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

// --- Row mapping ---

fn insert_audit(conn: &Connection, item_id: &str, entry: &NewAuditEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO audit_log (entry_id, item_id, status, reason, actor, confidence, reasons, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.entry_id,
            item_id,
            entry.status.as_str(),
            entry.reason,
            entry.actor.encode(),
            entry.confidence,
            serde_json::to_string(&entry.reasons)?,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("Failed to append audit entry")?;
    Ok(())
}

fn snapshot_columns(
    snapshot: Option<&ScoreSnapshot>,
) -> Result<(
    Option<bool>,
    Option<f64>,
    Option<String>,
    Option<String>,
    Option<String>,
)> {
    match snapshot {
        Some(s) => Ok((
            Some(s.is_toxic),
            Some(s.confidence),
            Some(serde_json::to_string(&s.reasons)?),
            Some(s.provider_id.clone()),
            Some(s.scored_at.clone()),
        )),
        None => Ok((None, None, None, None, None)),
    }
}

fn map_item(row: &Row) -> rusqlite::Result<ContentItem> {
    let status_raw: String = row.get(4)?;
    let kind_raw: String = row.get(2)?;

    let snap_provider: Option<String> = row.get(10)?;
    let snapshot = match snap_provider {
        Some(provider_id) => {
            let reasons_json: Option<String> = row.get(9)?;
            Some(ScoreSnapshot {
                is_toxic: row.get::<_, Option<bool>>(7)?.unwrap_or(false),
                confidence: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
                reasons: parse_reasons(reasons_json.as_deref()),
                provider_id,
                scored_at: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
            })
        }
        None => None,
    };

    let appeal_status: Option<String> = row.get(12)?;
    let appeal = match appeal_status.as_deref().and_then(AppealStatus::parse) {
        Some(status) => Some(Appeal {
            status,
            reason: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
            submitted_at: row.get::<_, Option<String>>(14)?.unwrap_or_default(),
            reviewed_by: row.get(15)?,
            reviewed_at: row.get(16)?,
            review_notes: row.get(17)?,
        }),
        None => None,
    };

    Ok(ContentItem {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind: ContentKind::parse(&kind_raw).unwrap_or(ContentKind::Post),
        text: row.get(3)?,
        status: ModerationStatus::parse(&status_raw).unwrap_or(ModerationStatus::Pending),
        is_visible: row.get(5)?,
        version: row.get(6)?,
        snapshot,
        appeal,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}

fn map_audit_entry(row: &Row) -> rusqlite::Result<AuditEntry> {
    let status_raw: String = row.get(3)?;
    let actor_raw: String = row.get(5)?;
    let reasons_json: Option<String> = row.get(7)?;

    Ok(AuditEntry {
        seq: row.get(0)?,
        entry_id: row.get(1)?,
        item_id: row.get(2)?,
        status: ModerationStatus::parse(&status_raw).unwrap_or(ModerationStatus::Pending),
        reason: row.get(4)?,
        actor: Actor::decode(&actor_raw),
        confidence: row.get(6)?,
        reasons: parse_reasons(reasons_json.as_deref()),
        created_at: row.get(8)?,
    })
}

fn parse_reasons(json: Option<&str>) -> Vec<String> {
    json.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}
