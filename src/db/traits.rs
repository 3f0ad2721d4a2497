// Database trait — backend-agnostic async interface for all DB operations.
//
// Implementor: SqliteDatabase (wraps rusqlite). All methods are async so a
// native-async backend could sit behind the same interface; the moderation
// components only ever see `Arc<dyn Database>`.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{AuditEntry, ContentItem, ModerationStats, NewAuditEntry};
use super::queries::TransitionOutcome;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Content items ---

    /// Insert a new item with its creation audit entries, atomically.
    async fn insert_content(&self, item: &ContentItem, audit: &[NewAuditEntry]) -> Result<()>;

    /// Load one item by id.
    async fn get_content(&self, id: &str) -> Result<Option<ContentItem>>;

    /// Version-checked write: persist `updated` (and the audit entry, if any)
    /// only if the stored version still equals `expected_version`.
    async fn apply_transition(
        &self,
        updated: &ContentItem,
        expected_version: i64,
        audit: Option<&NewAuditEntry>,
    ) -> Result<TransitionOutcome>;

    /// Delete an item and its audit history. Returns false if absent.
    async fn delete_content(&self, id: &str) -> Result<bool>;

    // --- Read side ---

    /// Items held for review or carrying a pending appeal, newest first,
    /// plus the total count for pagination.
    async fn review_queue(&self, offset: u32, limit: u32) -> Result<(Vec<ContentItem>, i64)>;

    /// Externally visible items, newest first, plus the total count.
    async fn visible_items(&self, offset: u32, limit: u32) -> Result<(Vec<ContentItem>, i64)>;

    /// Aggregate counts for the stats endpoint.
    async fn moderation_stats(&self) -> Result<ModerationStats>;

    /// Full moderation history for one item, in append order.
    async fn audit_trail(&self, item_id: &str) -> Result<Vec<AuditEntry>>;
}
