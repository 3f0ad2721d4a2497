// Database schema — table creation and migrations.
//
// We use a simple version-based migration approach: a `schema_version` table
// tracks which migrations have run, and each migration is a function that
// executes SQL statements.
//
// audit_log is append-only by construction: no UPDATE or DELETE statement for
// it exists anywhere in queries.rs; rows only disappear when the parent item
// is deleted (ON DELETE CASCADE).

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Moderated content items (posts and comments)
        CREATE TABLE IF NOT EXISTS content_items (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'post',
            text TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            is_visible INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL DEFAULT 1,   -- optimistic concurrency counter

            -- Last automated score (overwritten on each pass)
            snap_is_toxic INTEGER,
            snap_confidence REAL,
            snap_reasons TEXT,                    -- JSON array of strings
            snap_provider_id TEXT,
            snap_scored_at TEXT,

            -- Owner appeal (NULL appeal_status = no appeal on record)
            appeal_status TEXT,
            appeal_reason TEXT,
            appeal_submitted_at TEXT,
            appeal_reviewed_by TEXT,
            appeal_reviewed_at TEXT,
            appeal_review_notes TEXT,

            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- Append-only moderation history
        CREATE TABLE IF NOT EXISTS audit_log (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_id TEXT NOT NULL UNIQUE,
            item_id TEXT NOT NULL REFERENCES content_items(id) ON DELETE CASCADE,
            status TEXT NOT NULL,
            reason TEXT NOT NULL,
            actor TEXT NOT NULL,                  -- 'system' | 'moderator:<id>' | 'owner:<id>'
            confidence REAL,
            reasons TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Review queue lookup
        CREATE INDEX IF NOT EXISTS idx_items_status
            ON content_items(status);

        -- Pending-appeal lookup
        CREATE INDEX IF NOT EXISTS idx_items_appeal
            ON content_items(appeal_status);

        -- History reads for one item
        CREATE INDEX IF NOT EXISTS idx_audit_item
            ON audit_log(item_id);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
/// The migration function receives the connection and should execute its SQL.
#[allow(dead_code)]
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn expected_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, content_items, audit_log
        // (+ sqlite_sequence is excluded by the sqlite_% filter)
        assert_eq!(table_count(&conn).unwrap(), 3);
    }

    #[test]
    fn run_migration_applies_once() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        run_migration(&conn, 2, |c| {
            c.execute_batch("ALTER TABLE content_items ADD COLUMN extra TEXT;")
        })
        .unwrap();
        // Second call must be a no-op, not a duplicate-column error
        run_migration(&conn, 2, |c| {
            c.execute_batch("ALTER TABLE content_items ADD COLUMN extra TEXT;")
        })
        .unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![1, 2]);
    }
}
