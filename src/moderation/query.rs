// ModerationQueryService — the read side of the pipeline.
//
// Paginates the review queue and the public feed, aggregates stats, and
// serves per-item audit trails. Pure reads; never mutates state.

use std::sync::Arc;

use serde::Serialize;

use crate::db::models::{AuditEntry, ContentItem};
use crate::db::Database;
use crate::error::ModerationError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueuePage {
    pub items: Vec<ContentItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountWithPercentage {
    pub count: i64,
    pub percentage: i64,
}

/// Aggregate report for moderators, percentages rounded to integers.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_items: i64,
    pub approved: CountWithPercentage,
    pub rejected: CountWithPercentage,
    pub pending_review: i64,
    pub pending_appeals: i64,
}

pub struct ModerationQueryService {
    db: Arc<dyn Database>,
}

impl ModerationQueryService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Items awaiting a moderator: held for review or carrying a pending
    /// appeal, newest first.
    pub async fn review_queue(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<QueuePage, ModerationError> {
        let (page, limit, offset) = page_params(page, limit);
        let (items, total) = self.db.review_queue(offset, limit).await?;
        Ok(paged(items, total, page, limit, offset))
    }

    /// The externally visible feed, newest first.
    pub async fn visible_items(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<QueuePage, ModerationError> {
        let (page, limit, offset) = page_params(page, limit);
        let (items, total) = self.db.visible_items(offset, limit).await?;
        Ok(paged(items, total, page, limit, offset))
    }

    pub async fn stats(&self) -> Result<StatsReport, ModerationError> {
        let stats = self.db.moderation_stats().await?;
        Ok(StatsReport {
            total_items: stats.total_items,
            approved: CountWithPercentage {
                count: stats.approved,
                percentage: percentage(stats.approved, stats.total_items),
            },
            rejected: CountWithPercentage {
                count: stats.rejected,
                percentage: percentage(stats.rejected, stats.total_items),
            },
            pending_review: stats.pending_review,
            pending_appeals: stats.pending_appeals,
        })
    }

    /// Full moderation history for one item, in append order. NotFound when
    /// the item doesn't exist (an existing item always has at least one entry).
    pub async fn audit_trail(&self, item_id: &str) -> Result<Vec<AuditEntry>, ModerationError> {
        if self.db.get_content(item_id).await?.is_none() {
            return Err(ModerationError::NotFound(format!(
                "content {item_id} not found"
            )));
        }
        Ok(self.db.audit_trail(item_id).await?)
    }
}

fn page_params(page: Option<u32>, limit: Option<u32>) -> (u32, u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}

fn paged(items: Vec<ContentItem>, total: i64, page: u32, limit: u32, offset: u32) -> QueuePage {
    let total_pages = if total == 0 {
        0
    } else {
        ((total + i64::from(limit) - 1) / i64::from(limit)) as u32
    };
    let has_more = i64::from(offset) + (items.len() as i64) < total;
    QueuePage {
        items,
        pagination: Pagination {
            total,
            page,
            total_pages,
            has_more,
        },
    }
}

fn percentage(count: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_clamp_and_default() {
        assert_eq!(page_params(None, None), (1, 20, 0));
        assert_eq!(page_params(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_params(Some(3), Some(500)), (3, 100, 200));
    }

    #[test]
    fn pagination_math() {
        let page = paged(Vec::new(), 41, 1, 20, 0);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_more);

        let page = paged(Vec::new(), 0, 1, 20, 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_more);
    }

    #[test]
    fn percentages_round_and_handle_empty() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }
}
