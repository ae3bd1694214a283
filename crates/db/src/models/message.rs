//! Email message rows.

use bulkmail_core::error::CoreError;
use bulkmail_core::message::{Message, SendStatus};
use bulkmail_core::types::{Timestamp, Token};
use sqlx::FromRow;

use crate::models::content::ContentRow;

/// A row from the `email_messages` table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub token: Token,
    pub customer_id: Token,
    pub batch_token: Option<Token>,
    #[sqlx(flatten)]
    pub content: ContentRow,
    /// `NULL` until the delivery attempt settles.
    pub send_succeeded: Option<bool>,
    pub unsubscribed: bool,
    pub created_at: Timestamp,
}

impl TryFrom<MessageRow> for Message {
    type Error = CoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            token: row.token,
            recipient_id: row.customer_id,
            content: row.content.try_into()?,
            send_status: SendStatus::from_flag(row.send_succeeded),
            unsubscribed: row.unsubscribed,
            batch_token: row.batch_token,
            created_at: row.created_at,
        })
    }
}
