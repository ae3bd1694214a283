//! Sequential dispatch of one batch to a recipient list.

use std::sync::Arc;

use bulkmail_core::batch::BatchDefinition;
use bulkmail_core::error::CoreError;
use bulkmail_core::recipient::Recipient;
use bulkmail_core::report::DispatchResult;
use bulkmail_core::store::{BatchStore, MessageStore};

use crate::eligibility::EligibilityFilter;
use crate::trigger::DeliveryTrigger;

/// A dispatch run stopped by a store failure.
///
/// `partial` holds the counts reached before the failure. They were not
/// written to the batch.
#[derive(Debug, thiserror::Error)]
#[error("Dispatch aborted after {} initiated and {} skipped: {source}", .partial.initiated, .partial.skipped)]
pub struct DispatchError {
    pub partial: DispatchResult,
    #[source]
    pub source: CoreError,
}

impl From<CoreError> for DispatchError {
    fn from(source: CoreError) -> Self {
        Self {
            partial: DispatchResult::default(),
            source,
        }
    }
}

/// Walks recipients in order, one at a time.
///
/// Delivery for one recipient settles before the next begins. The batch's
/// counters are written once, after the last recipient.
#[derive(Clone)]
pub struct DispatchCoordinator {
    batches: Arc<dyn BatchStore>,
    messages: Arc<dyn MessageStore>,
    eligibility: EligibilityFilter,
    trigger: DeliveryTrigger,
}

impl DispatchCoordinator {
    pub fn new(
        batches: Arc<dyn BatchStore>,
        messages: Arc<dyn MessageStore>,
        trigger: DeliveryTrigger,
    ) -> Self {
        Self {
            eligibility: EligibilityFilter::new(Arc::clone(&messages)),
            batches,
            messages,
            trigger,
        }
    }

    /// Send `batch` to every eligible recipient.
    ///
    /// Suppressed recipients are counted as skipped and get no message.
    /// Every other recipient gets a stored message and one delivery attempt,
    /// and counts as initiated whatever the outcome. Running the same batch
    /// again creates new messages.
    pub async fn dispatch(
        &self,
        batch: &BatchDefinition,
        recipients: &[Recipient],
    ) -> Result<DispatchResult, DispatchError> {
        tracing::info!(
            batch_token = %batch.token,
            recipients = recipients.len(),
            "Dispatch started"
        );

        let mut result = DispatchResult::default();
        for recipient in recipients {
            if let Err(source) = self.process(batch, recipient, &mut result).await {
                tracing::error!(
                    batch_token = %batch.token,
                    recipient_id = %recipient.id,
                    initiated = result.initiated,
                    skipped = result.skipped,
                    error = %source,
                    "Dispatch aborted"
                );
                return Err(DispatchError {
                    partial: result,
                    source,
                });
            }
        }

        self.batches
            .record_dispatch_counts(batch.token, result)
            .await
            .map_err(|source| DispatchError {
                partial: result,
                source,
            })?;

        tracing::info!(
            batch_token = %batch.token,
            initiated = result.initiated,
            skipped = result.skipped,
            "Dispatch finished"
        );
        Ok(result)
    }

    async fn process(
        &self,
        batch: &BatchDefinition,
        recipient: &Recipient,
        result: &mut DispatchResult,
    ) -> Result<(), CoreError> {
        if self.eligibility.is_suppressed(recipient.id).await? {
            tracing::debug!(recipient_id = %recipient.id, "Skipping unsubscribed recipient");
            result.skipped += 1;
            return Ok(());
        }

        let message = self.messages.insert(batch.create_message(recipient)).await?;
        result.initiated += 1;
        self.trigger.fire(&message, recipient).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use bulkmail_core::batch::{BatchContent, EmailTemplate, NewBatch};
    use bulkmail_core::image::ImageRef;
    use bulkmail_core::message::{Message, NewMessage, SendStatus};
    use bulkmail_core::store::StoreResult;
    use bulkmail_core::transport::{MockMailTransport, TransportError};
    use bulkmail_core::types::{new_token, Token};

    use super::*;
    use crate::config::DispatchConfig;
    use crate::memory::MemoryStore;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn recipient(name: &str) -> Recipient {
        Recipient {
            id: new_token(),
            email: format!("{}@example.com", name.to_lowercase()),
            first_name: name.to_string(),
            last_name: "Tester".to_string(),
            company: None,
        }
    }

    fn new_batch() -> NewBatch {
        let logo = ImageRef {
            id: new_token(),
            url: "https://cdn.example.com/logo.png".to_string(),
        };
        NewBatch {
            batch_title: "Spring".to_string(),
            content: BatchContent {
                template: EmailTemplate::ModernStandard,
                subject: Some("Spring launch".to_string()),
                title: None,
                custom_message: None,
                call_to_action_text: "Learn More".to_string(),
                call_to_action_link: "https://www.example.com/".to_string(),
                company_logo: logo.clone(),
                alt_company_logo: None,
                primary_image: logo,
            },
        }
    }

    fn config() -> Arc<DispatchConfig> {
        Arc::new(DispatchConfig::new("news@acme.test", "/email/unsubscribe").unwrap())
    }

    fn accepting_transport(times: usize) -> MockMailTransport {
        let mut transport = MockMailTransport::new();
        transport.expect_send().times(times).returning(|_| Ok(1));
        transport
    }

    fn coordinator(store: Arc<MemoryStore>, transport: MockMailTransport) -> DispatchCoordinator {
        let trigger = DeliveryTrigger::new(store.clone(), Arc::new(transport), config());
        DispatchCoordinator::new(store.clone(), store, trigger)
    }

    /// Unsubscribe `recipient` by storing an earlier message and confirming it.
    async fn unsubscribe(store: &MemoryStore, recipient: &Recipient, batch: &BatchDefinition) {
        let earlier = store.insert(batch.create_message(recipient)).await.unwrap();
        store.mark_unsubscribed(earlier.token).await.unwrap();
    }

    // -----------------------------------------------------------------------
    // Counting and suppression
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn suppressed_recipient_is_skipped_without_a_message() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();
        let (a, b, c) = (recipient("A"), recipient("B"), recipient("C"));
        unsubscribe(&store, &b, &batch).await;
        let before = store.messages().await.len();

        let result = coordinator(store.clone(), accepting_transport(2))
            .dispatch(&batch, &[a.clone(), b.clone(), c.clone()])
            .await
            .unwrap();

        assert_eq!(result, DispatchResult { initiated: 2, skipped: 1 });
        let created: Vec<_> = store.messages().await.into_iter().skip(before).collect();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].recipient_id, a.id);
        assert_eq!(created[1].recipient_id, c.id);
        assert!(created.iter().all(|m| m.send_status == SendStatus::Succeeded));
        assert!(created.iter().all(|m| m.batch_token == Some(batch.token)));
    }

    #[tokio::test]
    async fn counters_are_written_to_the_batch() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();
        let (a, b) = (recipient("A"), recipient("B"));
        unsubscribe(&store, &b, &batch).await;

        coordinator(store.clone(), accepting_transport(1))
            .dispatch(&batch, &[a, b])
            .await
            .unwrap();

        let stored = BatchStore::find(store.as_ref(), batch.token).await.unwrap().unwrap();
        assert_eq!(stored.emails_initiated, 1);
        assert_eq!(stored.emails_skipped, 1);
    }

    #[tokio::test]
    async fn failed_sends_still_count_as_initiated() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();

        let mut transport = MockMailTransport::new();
        transport
            .expect_send()
            .times(2)
            .returning(|_| Err(TransportError::Rejected("550 mailbox unavailable".to_string())));

        let result = coordinator(store.clone(), transport)
            .dispatch(&batch, &[recipient("A"), recipient("B")])
            .await
            .unwrap();

        assert_eq!(result, DispatchResult { initiated: 2, skipped: 0 });
        assert!(store
            .messages()
            .await
            .iter()
            .all(|m| m.send_status == SendStatus::Failed));
    }

    #[tokio::test]
    async fn empty_recipient_list_records_zero_counts() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();

        let result = coordinator(store.clone(), accepting_transport(0))
            .dispatch(&batch, &[])
            .await
            .unwrap();

        assert_eq!(result, DispatchResult::default());
        assert!(store.messages().await.is_empty());
    }

    #[tokio::test]
    async fn rerunning_a_batch_creates_new_messages() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();
        let a = recipient("A");
        let coordinator = coordinator(store.clone(), accepting_transport(2));

        coordinator.dispatch(&batch, &[a.clone()]).await.unwrap();
        coordinator.dispatch(&batch, &[a]).await.unwrap();

        assert_eq!(store.list_for_batch(batch.token).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unset_alt_logo_stays_unset_on_messages() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();

        coordinator(store.clone(), accepting_transport(1))
            .dispatch(&batch, &[recipient("A")])
            .await
            .unwrap();

        let messages = store.messages().await;
        assert_eq!(messages[0].content.alt_company_logo, None);
    }

    // -----------------------------------------------------------------------
    // Failure policy
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn persistence_failure_aborts_without_committing_counts() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();
        store.fail_message_inserts_after(1);

        let err = coordinator(store.clone(), accepting_transport(1))
            .dispatch(&batch, &[recipient("A"), recipient("B"), recipient("C")])
            .await
            .unwrap_err();

        assert_matches!(err.source, CoreError::Persistence(_));
        assert_eq!(err.partial, DispatchResult { initiated: 1, skipped: 0 });
        let stored = BatchStore::find(store.as_ref(), batch.token).await.unwrap().unwrap();
        assert_eq!(stored.emails_initiated, 0);
        assert_eq!(stored.emails_skipped, 0);
        assert_eq!(store.messages().await.len(), 1);
    }

    /// Reports a recipient as eligible to the coordinator and as suppressed
    /// to every later check, as if they unsubscribed mid-run.
    struct UnsubscribesDuringDispatch {
        inner: Arc<MemoryStore>,
        checked: AtomicBool,
    }

    #[async_trait]
    impl MessageStore for UnsubscribesDuringDispatch {
        async fn insert(&self, message: NewMessage) -> StoreResult<Message> {
            self.inner.insert(message).await
        }
        async fn find(&self, token: Token) -> StoreResult<Option<Message>> {
            MessageStore::find(self.inner.as_ref(), token).await
        }
        async fn record_send_status(&self, token: Token, status: SendStatus) -> StoreResult<()> {
            self.inner.record_send_status(token, status).await
        }
        async fn mark_unsubscribed(&self, token: Token) -> StoreResult<bool> {
            self.inner.mark_unsubscribed(token).await
        }
        async fn has_unsubscribed(&self, _recipient_id: Token) -> StoreResult<bool> {
            Ok(self.checked.swap(true, Ordering::SeqCst))
        }
        async fn list_for_batch(&self, batch_token: Token) -> StoreResult<Vec<Message>> {
            self.inner.list_for_batch(batch_token).await
        }
    }

    #[tokio::test]
    async fn unsubscribe_between_check_and_delivery_prevents_send() {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchStore::create(store.as_ref(), new_batch()).await.unwrap();
        let racing: Arc<dyn MessageStore> = Arc::new(UnsubscribesDuringDispatch {
            inner: store.clone(),
            checked: AtomicBool::new(false),
        });

        let mut transport = MockMailTransport::new();
        transport.expect_send().never();
        let trigger = DeliveryTrigger::new(racing.clone(), Arc::new(transport), config());
        let coordinator = DispatchCoordinator::new(store.clone(), racing, trigger);

        let result = coordinator.dispatch(&batch, &[recipient("A")]).await.unwrap();

        assert_eq!(result, DispatchResult { initiated: 1, skipped: 0 });
        let messages = store.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].send_status, SendStatus::Failed);
    }
}
