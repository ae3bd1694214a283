//! Repository for the `email_messages` table.

use bulkmail_core::message::NewMessage;
use bulkmail_core::types::Token;
use sqlx::PgPool;

use crate::models::content::{bind_content, CONTENT_COLUMNS};
use crate::models::message::MessageRow;
use crate::repositories::placeholders;

fn message_columns() -> String {
    format!(
        "token, customer_id, batch_token, {CONTENT_COLUMNS}, \
         send_succeeded, unsubscribed, created_at"
    )
}

/// Provides persistence for individual email messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert a message with `send_succeeded` left `NULL`.
    pub async fn create(pool: &PgPool, message: &NewMessage) -> Result<MessageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_messages (customer_id, batch_token, {CONTENT_COLUMNS}) \
             VALUES ($1, $2, {}) \
             RETURNING {}",
            placeholders(3, 12),
            message_columns()
        );
        let insert = sqlx::query_as::<_, MessageRow>(&query)
            .bind(message.recipient_id)
            .bind(message.batch_token);
        bind_content(insert, &message.content).fetch_one(pool).await
    }

    pub async fn find_by_token(pool: &PgPool, token: Token) -> Result<Option<MessageRow>, sqlx::Error> {
        let query = format!("SELECT {} FROM email_messages WHERE token = $1", message_columns());
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Record the delivery outcome. Leaves every other column alone.
    pub async fn set_send_succeeded(
        pool: &PgPool,
        token: Token,
        succeeded: Option<bool>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE email_messages SET send_succeeded = $2 WHERE token = $1")
            .bind(token)
            .bind(succeeded)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `unsubscribed = true`. Idempotent; returns `false` for unknown tokens.
    pub async fn mark_unsubscribed(pool: &PgPool, token: Token) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE email_messages SET unsubscribed = true WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any message to this customer has been used to unsubscribe.
    pub async fn customer_has_unsubscribed(pool: &PgPool, customer_id: Token) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (\
                 SELECT 1 FROM email_messages WHERE customer_id = $1 AND unsubscribed\
             )",
        )
        .bind(customer_id)
        .fetch_one(pool)
        .await
    }

    /// Messages belonging to a batch, newest first.
    pub async fn list_for_batch(pool: &PgPool, batch_token: Token) -> Result<Vec<MessageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM email_messages WHERE batch_token = $1 ORDER BY created_at DESC",
            message_columns()
        );
        sqlx::query_as::<_, MessageRow>(&query)
            .bind(batch_token)
            .fetch_all(pool)
            .await
    }
}
