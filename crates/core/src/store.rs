//! Storage seams used by the dispatch engine.
//!
//! The PostgreSQL implementation lives in `bulkmail-db`; an in-memory one for
//! tests lives in `bulkmail-dispatch`. Storing a message never delivers it.

use async_trait::async_trait;

use crate::batch::{BatchDefinition, NewBatch};
use crate::error::CoreError;
use crate::image::{ImageResource, NewImage};
use crate::message::{Message, NewMessage, SendStatus};
use crate::recipient::Recipient;
use crate::report::{BatchStats, DispatchResult};
use crate::types::Token;

/// Result alias for store operations. Backend failures surface as
/// [`CoreError::Persistence`].
pub type StoreResult<T> = Result<T, CoreError>;

/// Message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message. Its send status starts as not attempted.
    async fn insert(&self, message: NewMessage) -> StoreResult<Message>;

    async fn find(&self, token: Token) -> StoreResult<Option<Message>>;

    /// Record the delivery outcome. Touches only the send status.
    async fn record_send_status(&self, token: Token, status: SendStatus) -> StoreResult<()>;

    /// Set `unsubscribed = true`. Touches only that flag and never clears it.
    ///
    /// Returns `false` when no message has this token.
    async fn mark_unsubscribed(&self, token: Token) -> StoreResult<bool>;

    /// Whether any message for this recipient has been used to unsubscribe.
    async fn has_unsubscribed(&self, recipient_id: Token) -> StoreResult<bool>;

    /// Messages created for a batch, newest first.
    async fn list_for_batch(&self, batch_token: Token) -> StoreResult<Vec<Message>>;
}

/// Batch definition persistence.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Persist a new batch with zeroed counters and a fresh token.
    async fn create(&self, batch: NewBatch) -> StoreResult<BatchDefinition>;

    async fn find(&self, token: Token) -> StoreResult<Option<BatchDefinition>>;

    /// Batches ordered by title; archived ones only when asked for.
    async fn list(&self, include_archived: bool) -> StoreResult<Vec<BatchDefinition>>;

    /// Set the archived flag. Idempotent; returns `false` for unknown tokens.
    async fn set_archived(&self, token: Token, archived: bool) -> StoreResult<bool>;

    /// Overwrite both aggregate counters in a single write.
    async fn record_dispatch_counts(&self, token: Token, result: DispatchResult)
        -> StoreResult<()>;

    /// Sent / unsubscribed counts derived from the batch's messages.
    async fn stats(&self, token: Token) -> StoreResult<BatchStats>;
}

/// Read access to CRM customer records.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn find(&self, id: Token) -> StoreResult<Option<Recipient>>;

    /// Recipients for `ids`, in the order given. Unknown ids are a
    /// [`CoreError::NotFound`].
    async fn find_many(&self, ids: &[Token]) -> StoreResult<Vec<Recipient>>;
}

/// Image resource persistence.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn create(&self, image: NewImage) -> StoreResult<ImageResource>;

    /// Images for `ids`; unknown ids are simply absent from the result.
    async fn find_many(&self, ids: &[Token]) -> StoreResult<Vec<ImageResource>>;

    async fn list(&self, include_archived: bool) -> StoreResult<Vec<ImageResource>>;

    async fn set_archived(&self, token: Token, archived: bool) -> StoreResult<bool>;
}

/// Put `found` into the order of `ids`, failing on the first id with no match.
pub fn order_by_ids(
    entity: &'static str,
    ids: &[Token],
    found: Vec<Recipient>,
) -> StoreResult<Vec<Recipient>> {
    ids.iter()
        .map(|id| {
            found
                .iter()
                .find(|recipient| recipient.id == *id)
                .cloned()
                .ok_or_else(|| CoreError::not_found(entity, *id))
        })
        .collect()
}
