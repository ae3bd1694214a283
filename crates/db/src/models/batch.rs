//! Email batch rows.

use bulkmail_core::batch::BatchDefinition;
use bulkmail_core::error::CoreError;
use bulkmail_core::types::{Timestamp, Token};
use sqlx::FromRow;

use crate::models::content::ContentRow;

/// A row from the `email_batches` table.
#[derive(Debug, Clone, FromRow)]
pub struct BatchRow {
    pub token: Token,
    pub batch_title: String,
    #[sqlx(flatten)]
    pub content: ContentRow,
    pub emails_initiated: i64,
    pub emails_skipped: i64,
    pub archived: bool,
    pub created_at: Timestamp,
}

impl TryFrom<BatchRow> for BatchDefinition {
    type Error = CoreError;

    fn try_from(row: BatchRow) -> Result<Self, Self::Error> {
        Ok(BatchDefinition {
            token: row.token,
            batch_title: row.batch_title,
            content: row.content.try_into()?,
            emails_initiated: row.emails_initiated,
            emails_skipped: row.emails_skipped,
            archived: row.archived,
            created_at: row.created_at,
        })
    }
}

/// Aggregate counts derived from a batch's messages.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BatchStatsRow {
    pub emails_sent: i64,
    pub unsubscribe_count: i64,
}
