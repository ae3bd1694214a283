//! [`PgStore`]: the PostgreSQL implementation of the core store traits.

use async_trait::async_trait;
use bulkmail_core::batch::{BatchDefinition, NewBatch};
use bulkmail_core::error::CoreError;
use bulkmail_core::image::{ImageResource, NewImage};
use bulkmail_core::message::{Message, NewMessage, SendStatus};
use bulkmail_core::recipient::Recipient;
use bulkmail_core::report::{BatchStats, DispatchResult};
use bulkmail_core::store::{
    order_by_ids, BatchStore, ImageStore, MessageStore, RecipientDirectory, StoreResult,
};
use bulkmail_core::types::Token;

use crate::repositories::{BatchRepo, CustomerRepo, ImageRepo, MessageRepo};
use crate::DbPool;

/// Store backed by a PostgreSQL pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn persistence(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database operation failed");
    CoreError::Persistence(err.to_string())
}

#[async_trait]
impl MessageStore for PgStore {
    async fn insert(&self, message: NewMessage) -> StoreResult<Message> {
        MessageRepo::create(&self.pool, &message)
            .await
            .map_err(persistence)?
            .try_into()
    }

    async fn find(&self, token: Token) -> StoreResult<Option<Message>> {
        MessageRepo::find_by_token(&self.pool, token)
            .await
            .map_err(persistence)?
            .map(Message::try_from)
            .transpose()
    }

    async fn record_send_status(&self, token: Token, status: SendStatus) -> StoreResult<()> {
        let updated = MessageRepo::set_send_succeeded(&self.pool, token, status.as_flag())
            .await
            .map_err(persistence)?;
        if !updated {
            return Err(CoreError::not_found("Message", token));
        }
        Ok(())
    }

    async fn mark_unsubscribed(&self, token: Token) -> StoreResult<bool> {
        MessageRepo::mark_unsubscribed(&self.pool, token)
            .await
            .map_err(persistence)
    }

    async fn has_unsubscribed(&self, recipient_id: Token) -> StoreResult<bool> {
        MessageRepo::customer_has_unsubscribed(&self.pool, recipient_id)
            .await
            .map_err(persistence)
    }

    async fn list_for_batch(&self, batch_token: Token) -> StoreResult<Vec<Message>> {
        MessageRepo::list_for_batch(&self.pool, batch_token)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }
}

#[async_trait]
impl BatchStore for PgStore {
    async fn create(&self, batch: NewBatch) -> StoreResult<BatchDefinition> {
        BatchRepo::create(&self.pool, &batch)
            .await
            .map_err(persistence)?
            .try_into()
    }

    async fn find(&self, token: Token) -> StoreResult<Option<BatchDefinition>> {
        BatchRepo::find_by_token(&self.pool, token)
            .await
            .map_err(persistence)?
            .map(BatchDefinition::try_from)
            .transpose()
    }

    async fn list(&self, include_archived: bool) -> StoreResult<Vec<BatchDefinition>> {
        BatchRepo::list(&self.pool, include_archived)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(BatchDefinition::try_from)
            .collect()
    }

    async fn set_archived(&self, token: Token, archived: bool) -> StoreResult<bool> {
        BatchRepo::set_archived(&self.pool, token, archived)
            .await
            .map_err(persistence)
    }

    async fn record_dispatch_counts(&self, token: Token, result: DispatchResult) -> StoreResult<()> {
        let updated = BatchRepo::record_dispatch_counts(&self.pool, token, result)
            .await
            .map_err(persistence)?;
        if !updated {
            return Err(CoreError::not_found("EmailBatch", token));
        }
        Ok(())
    }

    async fn stats(&self, token: Token) -> StoreResult<BatchStats> {
        let row = BatchRepo::stats(&self.pool, token)
            .await
            .map_err(persistence)?;
        Ok(BatchStats {
            emails_sent: row.emails_sent,
            unsubscribe_count: row.unsubscribe_count,
        })
    }
}

#[async_trait]
impl RecipientDirectory for PgStore {
    async fn find(&self, id: Token) -> StoreResult<Option<Recipient>> {
        Ok(CustomerRepo::find_by_id(&self.pool, id)
            .await
            .map_err(persistence)?
            .map(Recipient::from))
    }

    async fn find_many(&self, ids: &[Token]) -> StoreResult<Vec<Recipient>> {
        let found = CustomerRepo::find_many(&self.pool, ids)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(Recipient::from)
            .collect();
        order_by_ids("Customer", ids, found)
    }
}

#[async_trait]
impl ImageStore for PgStore {
    async fn create(&self, image: NewImage) -> StoreResult<ImageResource> {
        ImageRepo::create(&self.pool, &image)
            .await
            .map_err(persistence)?
            .try_into()
    }

    async fn find_many(&self, ids: &[Token]) -> StoreResult<Vec<ImageResource>> {
        ImageRepo::find_many(&self.pool, ids)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(ImageResource::try_from)
            .collect()
    }

    async fn list(&self, include_archived: bool) -> StoreResult<Vec<ImageResource>> {
        ImageRepo::list(&self.pool, include_archived)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(ImageResource::try_from)
            .collect()
    }

    async fn set_archived(&self, token: Token, archived: bool) -> StoreResult<bool> {
        ImageRepo::set_archived(&self.pool, token, archived)
            .await
            .map_err(persistence)
    }
}
