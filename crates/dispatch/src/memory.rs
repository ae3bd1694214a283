//! In-memory implementation of the core store traits for engine tests.

use std::sync::atomic::{AtomicUsize, Ordering};

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
use bulkmail_core::types::{new_token, Token};
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    batches: Vec<BatchDefinition>,
    messages: Vec<Message>,
    recipients: Vec<Recipient>,
    images: Vec<ImageResource>,
}

/// Thread-safe in-memory store.
///
/// Message inserts can be made to fail after a given number of successes to
/// simulate a database outage in the middle of a dispatch run.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<State>,
    inserts_before_failure: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            state: RwLock::default(),
            inserts_before_failure: AtomicUsize::new(usize::MAX),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a CRM customer.
    pub async fn add_recipient(&self, recipient: Recipient) {
        self.state.write().await.recipients.push(recipient);
    }

    /// Let `count` more message inserts succeed, then fail every later one
    /// with a persistence error.
    pub fn fail_message_inserts_after(&self, count: usize) {
        self.inserts_before_failure.store(count, Ordering::SeqCst);
    }

    /// Snapshot of every stored message, in insertion order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(&self, message: NewMessage) -> StoreResult<Message> {
        let remaining = self.inserts_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(CoreError::Persistence("connection reset".to_string()));
        }
        if remaining != usize::MAX {
            self.inserts_before_failure.store(remaining - 1, Ordering::SeqCst);
        }

        let stored = Message {
            token: new_token(),
            recipient_id: message.recipient_id,
            content: message.content,
            send_status: SendStatus::NotAttempted,
            unsubscribed: false,
            batch_token: message.batch_token,
            created_at: Utc::now(),
        };
        self.state.write().await.messages.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, token: Token) -> StoreResult<Option<Message>> {
        let state = self.state.read().await;
        Ok(state.messages.iter().find(|m| m.token == token).cloned())
    }

    async fn record_send_status(&self, token: Token, status: SendStatus) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.token == token)
            .ok_or_else(|| CoreError::not_found("Message", token))?;
        message.send_status = status;
        Ok(())
    }

    async fn mark_unsubscribed(&self, token: Token) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.messages.iter_mut().find(|m| m.token == token) {
            Some(message) => {
                message.unsubscribed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn has_unsubscribed(&self, recipient_id: Token) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .any(|m| m.recipient_id == recipient_id && m.unsubscribed))
    }

    async fn list_for_batch(&self, batch_token: Token) -> StoreResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .rev()
            .filter(|m| m.batch_token == Some(batch_token))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BatchStore for MemoryStore {
    async fn create(&self, batch: NewBatch) -> StoreResult<BatchDefinition> {
        let stored = BatchDefinition {
            token: new_token(),
            batch_title: batch.batch_title,
            content: batch.content,
            emails_initiated: 0,
            emails_skipped: 0,
            archived: false,
            created_at: Utc::now(),
        };
        self.state.write().await.batches.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, token: Token) -> StoreResult<Option<BatchDefinition>> {
        let state = self.state.read().await;
        Ok(state.batches.iter().find(|b| b.token == token).cloned())
    }

    async fn list(&self, include_archived: bool) -> StoreResult<Vec<BatchDefinition>> {
        let state = self.state.read().await;
        let mut batches: Vec<_> = state
            .batches
            .iter()
            .filter(|b| include_archived || !b.archived)
            .cloned()
            .collect();
        batches.sort_by(|a, b| a.batch_title.cmp(&b.batch_title));
        Ok(batches)
    }

    async fn set_archived(&self, token: Token, archived: bool) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.batches.iter_mut().find(|b| b.token == token) {
            Some(batch) => {
                batch.archived = archived;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_dispatch_counts(&self, token: Token, result: DispatchResult) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let batch = state
            .batches
            .iter_mut()
            .find(|b| b.token == token)
            .ok_or_else(|| CoreError::not_found("EmailBatch", token))?;
        batch.emails_initiated = result.initiated;
        batch.emails_skipped = result.skipped;
        Ok(())
    }

    async fn stats(&self, token: Token) -> StoreResult<BatchStats> {
        let state = self.state.read().await;
        let messages = state
            .messages
            .iter()
            .filter(|m| m.batch_token == Some(token));
        let (mut emails_sent, mut unsubscribe_count) = (0, 0);
        for message in messages {
            if message.send_status == SendStatus::Succeeded {
                emails_sent += 1;
            }
            if message.unsubscribed {
                unsubscribe_count += 1;
            }
        }
        Ok(BatchStats {
            emails_sent,
            unsubscribe_count,
        })
    }
}

#[async_trait]
impl RecipientDirectory for MemoryStore {
    async fn find(&self, id: Token) -> StoreResult<Option<Recipient>> {
        let state = self.state.read().await;
        Ok(state.recipients.iter().find(|r| r.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Token]) -> StoreResult<Vec<Recipient>> {
        let state = self.state.read().await;
        order_by_ids("Customer", ids, state.recipients.clone())
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn create(&self, image: NewImage) -> StoreResult<ImageResource> {
        let stored = ImageResource {
            token: new_token(),
            description: image.description,
            url: image.url,
            category: image.category,
            archived: false,
            uploaded_at: Utc::now(),
        };
        self.state.write().await.images.push(stored.clone());
        Ok(stored)
    }

    async fn find_many(&self, ids: &[Token]) -> StoreResult<Vec<ImageResource>> {
        let state = self.state.read().await;
        Ok(state
            .images
            .iter()
            .filter(|image| ids.contains(&image.token))
            .cloned()
            .collect())
    }

    async fn list(&self, include_archived: bool) -> StoreResult<Vec<ImageResource>> {
        let state = self.state.read().await;
        Ok(state
            .images
            .iter()
            .rev()
            .filter(|image| include_archived || !image.archived)
            .cloned()
            .collect())
    }

    async fn set_archived(&self, token: Token, archived: bool) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.images.iter_mut().find(|image| image.token == token) {
            Some(image) => {
                image.archived = archived;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
