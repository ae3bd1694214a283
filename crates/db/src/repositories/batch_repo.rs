//! Repository for the `email_batches` table.

use bulkmail_core::batch::NewBatch;
use bulkmail_core::report::DispatchResult;
use bulkmail_core::types::Token;
use sqlx::PgPool;

use crate::models::batch::{BatchRow, BatchStatsRow};
use crate::models::content::{bind_content, CONTENT_COLUMNS};
use crate::repositories::placeholders;

// ---------------------------------------------------------------------------
// Column list
// ---------------------------------------------------------------------------

fn batch_columns() -> String {
    format!(
        "token, batch_title, {CONTENT_COLUMNS}, \
         emails_initiated, emails_skipped, archived, created_at"
    )
}

/// Provides persistence for batch definitions.
pub struct BatchRepo;

impl BatchRepo {
    /// Insert a new batch. Counters start at zero.
    pub async fn create(pool: &PgPool, batch: &NewBatch) -> Result<BatchRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_batches (batch_title, {CONTENT_COLUMNS}) \
             VALUES ($1, {}) \
             RETURNING {}",
            placeholders(2, 12),
            batch_columns()
        );
        let insert = sqlx::query_as::<_, BatchRow>(&query).bind(batch.batch_title.as_str());
        bind_content(insert, &batch.content).fetch_one(pool).await
    }

    /// Find a batch by token, archived or not.
    pub async fn find_by_token(pool: &PgPool, token: Token) -> Result<Option<BatchRow>, sqlx::Error> {
        let query = format!("SELECT {} FROM email_batches WHERE token = $1", batch_columns());
        sqlx::query_as::<_, BatchRow>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List batches ordered by title.
    pub async fn list(pool: &PgPool, include_archived: bool) -> Result<Vec<BatchRow>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM email_batches \
             WHERE ($1 OR NOT archived) \
             ORDER BY batch_title ASC, created_at DESC",
            batch_columns()
        );
        sqlx::query_as::<_, BatchRow>(&query)
            .bind(include_archived)
            .fetch_all(pool)
            .await
    }

    /// Set the archived flag. Returns `false` if no batch has this token.
    pub async fn set_archived(pool: &PgPool, token: Token, archived: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE email_batches SET archived = $2 WHERE token = $1")
            .bind(token)
            .bind(archived)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite both dispatch counters in one statement.
    pub async fn record_dispatch_counts(
        pool: &PgPool,
        token: Token,
        counts: DispatchResult,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE email_batches SET emails_initiated = $2, emails_skipped = $3 \
             WHERE token = $1",
        )
        .bind(token)
        .bind(counts.initiated)
        .bind(counts.skipped)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count successful sends and unsubscribes among the batch's messages.
    pub async fn stats(pool: &PgPool, token: Token) -> Result<BatchStatsRow, sqlx::Error> {
        sqlx::query_as::<_, BatchStatsRow>(
            "SELECT \
                 COUNT(*) FILTER (WHERE send_succeeded IS TRUE) AS emails_sent, \
                 COUNT(*) FILTER (WHERE unsubscribed) AS unsubscribe_count \
             FROM email_messages WHERE batch_token = $1",
        )
        .bind(token)
        .fetch_one(pool)
        .await
    }
}
