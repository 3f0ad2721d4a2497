// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock also serializes writers per process, so the version check in
// apply_transition only ever loses to writes from other processes.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{AuditEntry, ContentItem, ModerationStats, NewAuditEntry};
use super::queries::{self, TransitionOutcome};
use super::traits::Database;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn insert_content(&self, item: &ContentItem, audit: &[NewAuditEntry]) -> Result<()> {
        let mut conn = self.conn.lock().await;
        queries::insert_content(&mut conn, item, audit)
    }

    async fn get_content(&self, id: &str) -> Result<Option<ContentItem>> {
        let conn = self.conn.lock().await;
        queries::get_content(&conn, id)
    }

    async fn apply_transition(
        &self,
        updated: &ContentItem,
        expected_version: i64,
        audit: Option<&NewAuditEntry>,
    ) -> Result<TransitionOutcome> {
        let mut conn = self.conn.lock().await;
        queries::apply_transition(&mut conn, updated, expected_version, audit)
    }

    async fn delete_content(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().await;
        queries::delete_content(&mut conn, id)
    }

    async fn review_queue(&self, offset: u32, limit: u32) -> Result<(Vec<ContentItem>, i64)> {
        let conn = self.conn.lock().await;
        queries::review_queue(&conn, offset, limit)
    }

    async fn visible_items(&self, offset: u32, limit: u32) -> Result<(Vec<ContentItem>, i64)> {
        let conn = self.conn.lock().await;
        queries::visible_items(&conn, offset, limit)
    }

    async fn moderation_stats(&self) -> Result<ModerationStats> {
        let conn = self.conn.lock().await;
        queries::moderation_stats(&conn)
    }

    async fn audit_trail(&self, item_id: &str) -> Result<Vec<AuditEntry>> {
        let conn = self.conn.lock().await;
        queries::audit_trail(&conn, item_id)
    }
}
