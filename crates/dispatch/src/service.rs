//! Entry points for staff-facing operations.

use std::sync::Arc;

use bulkmail_core::batch::{BatchDefinition, BatchFields};
use bulkmail_core::error::CoreError;
use bulkmail_core::recipient::Recipient;
use bulkmail_core::render::{EmailView, RenderContext, PREVIEW_UNSUBSCRIBE_LINK};
use bulkmail_core::report::DispatchResult;
use bulkmail_core::store::{BatchStore, ImageStore, MessageStore, RecipientDirectory};
use bulkmail_core::transport::MailTransport;
use bulkmail_core::types::Token;
use serde::Serialize;

use crate::config::DispatchConfig;
use crate::coordinator::{DispatchCoordinator, DispatchError};
use crate::eligibility::EligibilityFilter;
use crate::trigger::DeliveryTrigger;
use crate::unsubscribe::UnsubscribeHandler;

/// The stores the engine runs against.
#[derive(Clone)]
pub struct Stores {
    pub batches: Arc<dyn BatchStore>,
    pub messages: Arc<dyn MessageStore>,
    pub recipients: Arc<dyn RecipientDirectory>,
    pub images: Arc<dyn ImageStore>,
}

impl Stores {
    /// Use one backend for every store.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: BatchStore + MessageStore + RecipientDirectory + ImageStore + 'static,
    {
        Self {
            batches: store.clone(),
            messages: store.clone(),
            recipients: store.clone(),
            images: store,
        }
    }
}

/// A finished dispatch run and the batch it ran against.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub batch: BatchDefinition,
    pub result: DispatchResult,
    pub summary: String,
}

impl DispatchReport {
    fn new(mut batch: BatchDefinition, result: DispatchResult) -> Self {
        batch.emails_initiated = result.initiated;
        batch.emails_skipped = result.skipped;
        Self {
            summary: result.summary(),
            batch,
            result,
        }
    }
}

/// Creates, clones, previews and dispatches batches.
pub struct MassEmailService {
    stores: Stores,
    coordinator: DispatchCoordinator,
    eligibility: EligibilityFilter,
    unsubscribe: UnsubscribeHandler,
}

impl MassEmailService {
    pub fn new(stores: Stores, transport: Arc<dyn MailTransport>, config: DispatchConfig) -> Self {
        let config = Arc::new(config);
        let trigger = DeliveryTrigger::new(stores.messages.clone(), transport, config.clone());
        Self {
            coordinator: DispatchCoordinator::new(
                stores.batches.clone(),
                stores.messages.clone(),
                trigger,
            ),
            eligibility: EligibilityFilter::new(stores.messages.clone()),
            unsubscribe: UnsubscribeHandler::new(
                stores.messages.clone(),
                stores.recipients.clone(),
                config,
            ),
            stores,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn unsubscribe(&self) -> &UnsubscribeHandler {
        &self.unsubscribe
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    /// Validate the field map and store it as a new batch.
    pub async fn create_batch(&self, fields: BatchFields) -> Result<BatchDefinition, CoreError> {
        let images = self.stores.images.find_many(&fields.image_ids()).await?;
        let new_batch = fields.into_new_batch(&images)?;
        let batch = self.stores.batches.create(new_batch).await?;
        tracing::info!(batch_token = %batch.token, title = %batch.batch_title, "Batch created");
        Ok(batch)
    }

    /// Store a copy of an existing batch under `new_title`.
    pub async fn clone_batch(
        &self,
        batch_token: Token,
        new_title: &str,
    ) -> Result<BatchDefinition, CoreError> {
        let existing = self.find_batch(batch_token).await?;
        let copy = existing.clone_definition(new_title)?;
        let batch = self.stores.batches.create(copy).await?;
        tracing::info!(
            batch_token = %batch.token,
            cloned_from = %batch_token,
            "Batch cloned"
        );
        Ok(batch)
    }

    pub async fn find_batch(&self, batch_token: Token) -> Result<BatchDefinition, CoreError> {
        self.stores
            .batches
            .find(batch_token)
            .await?
            .ok_or_else(|| CoreError::not_found("EmailBatch", batch_token))
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Look up recipients by id, in the order given.
    pub async fn recipients(&self, ids: &[Token]) -> Result<Vec<Recipient>, CoreError> {
        self.stores.recipients.find_many(ids).await
    }

    /// Create a batch from `fields` and send it to `recipients`.
    ///
    /// Invalid fields are rejected before anything is stored.
    pub async fn start_dispatch(
        &self,
        fields: BatchFields,
        recipients: &[Recipient],
    ) -> Result<DispatchReport, DispatchError> {
        let batch = self.create_batch(fields).await?;
        let result = self.coordinator.dispatch(&batch, recipients).await?;
        Ok(DispatchReport::new(batch, result))
    }

    /// Clone an existing batch under `new_title` and send the copy to
    /// `recipients`.
    pub async fn start_dispatch_from_existing(
        &self,
        existing_batch_token: Token,
        new_title: &str,
        recipients: &[Recipient],
    ) -> Result<DispatchReport, DispatchError> {
        let batch = self.clone_batch(existing_batch_token, new_title).await?;
        let result = self.coordinator.dispatch(&batch, recipients).await?;
        Ok(DispatchReport::new(batch, result))
    }

    /// Whether the recipient may still be emailed.
    pub async fn can_email(&self, recipient_id: Token) -> Result<bool, CoreError> {
        if self.stores.recipients.find(recipient_id).await?.is_none() {
            return Err(CoreError::not_found("Customer", recipient_id));
        }
        Ok(!self.eligibility.is_suppressed(recipient_id).await?)
    }

    // -----------------------------------------------------------------------
    // Preview
    // -----------------------------------------------------------------------

    /// Render context for an unsaved field map. Missing images render as
    /// placeholders.
    pub async fn preview_fields(
        &self,
        fields: &BatchFields,
        customer: Recipient,
    ) -> Result<RenderContext, CoreError> {
        let images = self.stores.images.find_many(&fields.image_ids()).await?;
        let view = EmailView::from_fields(fields, &images)?;
        Ok(RenderContext::new(
            fields.template()?,
            customer,
            view,
            PREVIEW_UNSUBSCRIBE_LINK,
        ))
    }

    /// Render context for a stored batch.
    pub async fn preview_batch(
        &self,
        batch_token: Token,
        customer: Recipient,
    ) -> Result<RenderContext, CoreError> {
        let batch = self.find_batch(batch_token).await?;
        Ok(RenderContext::preview(&batch.content, customer))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bulkmail_core::image::{ImageCategory, ImageResource, NewImage};
    use bulkmail_core::message::SendStatus;
    use bulkmail_core::render::DEFAULT_IMAGE_URL;
    use bulkmail_core::transport::MockMailTransport;
    use bulkmail_core::types::new_token;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::unsubscribe::UnsubscribeRequest;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn config() -> DispatchConfig {
        DispatchConfig::new("news@acme.test", "https://mail.acme.test/email/unsubscribe").unwrap()
    }

    fn service(store: Arc<MemoryStore>, sends: usize) -> MassEmailService {
        let mut transport = MockMailTransport::new();
        transport.expect_send().times(sends).returning(|_| Ok(1));
        MassEmailService::new(Stores::shared(store), Arc::new(transport), config())
    }

    async fn image(store: &MemoryStore, name: &str) -> ImageResource {
        ImageStore::create(
            store,
            NewImage {
                description: name.to_string(),
                url: format!("https://cdn.example.com/{name}.png"),
                category: ImageCategory::Marketing,
            },
        )
        .await
        .unwrap()
    }

    async fn fields(store: &MemoryStore, title: &str) -> BatchFields {
        BatchFields {
            batch_title: title.to_string(),
            subject: Some("Spring launch".to_string()),
            company_logo: Some(image(store, "logo").await.token),
            primary_image: Some(image(store, "hero").await.token),
            ..Default::default()
        }
    }

    async fn recipient(store: &MemoryStore, name: &str) -> Recipient {
        let recipient = Recipient {
            id: new_token(),
            email: format!("{name}@example.com"),
            first_name: name.to_string(),
            last_name: String::new(),
            company: None,
        };
        store.add_recipient(recipient.clone()).await;
        recipient
    }

    // -----------------------------------------------------------------------
    // Dispatch paths
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn start_dispatch_creates_batch_and_reports_counts() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone(), 2);
        let a = recipient(&store, "ada").await;
        let b = recipient(&store, "bob").await;

        let report = service
            .start_dispatch(fields(&store, "Spring").await, &[a, b])
            .await
            .unwrap();

        assert_eq!(report.result, DispatchResult { initiated: 2, skipped: 0 });
        assert_eq!(report.batch.emails_initiated, 2);
        assert_eq!(
            report.summary,
            "We reached 2 prospects with this email! 0 did not receive this email because they have unsubscribed"
        );
        let stored = service.find_batch(report.batch.token).await.unwrap();
        assert_eq!(stored.emails_initiated, 2);
    }

    #[tokio::test]
    async fn invalid_fields_store_nothing() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone(), 0);
        let a = recipient(&store, "ada").await;
        let mut invalid = fields(&store, "Spring").await;
        invalid.primary_image = None;

        let err = service.start_dispatch(invalid, &[a]).await.unwrap_err();

        assert_matches!(err.source, CoreError::Validation(_));
        assert!(BatchStore::list(store.as_ref(), true).await.unwrap().is_empty());
        assert!(store.messages().await.is_empty());
    }

    #[tokio::test]
    async fn dispatch_from_existing_sends_a_renamed_copy() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone(), 1);
        let original = service.create_batch(fields(&store, "Q1 Campaign").await).await.unwrap();
        let a = recipient(&store, "ada").await;

        let report = service
            .start_dispatch_from_existing(original.token, "Q2 Campaign", &[a])
            .await
            .unwrap();

        assert_ne!(report.batch.token, original.token);
        assert_eq!(report.batch.batch_title, "Q2 Campaign");
        assert_eq!(report.batch.content, original.content);
        let untouched = service.find_batch(original.token).await.unwrap();
        assert_eq!(untouched.emails_initiated, 0);
    }

    #[tokio::test]
    async fn dispatch_from_existing_rejects_empty_title() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone(), 0);
        let original = service.create_batch(fields(&store, "Q1").await).await.unwrap();

        let err = service
            .start_dispatch_from_existing(original.token, "  ", &[])
            .await
            .unwrap_err();

        assert_matches!(err.source, CoreError::Validation(_));
        assert_eq!(BatchStore::list(store.as_ref(), true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dispatch_from_unknown_batch_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store, 0);

        let err = service
            .start_dispatch_from_existing(new_token(), "Copy", &[])
            .await
            .unwrap_err();

        assert_matches!(err.source, CoreError::NotFound { .. });
    }

    #[tokio::test]
    async fn unsubscribed_recipient_is_skipped_on_next_dispatch() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone(), 2);
        let a = recipient(&store, "ada").await;
        let b = recipient(&store, "bob").await;

        let first = service
            .start_dispatch(fields(&store, "First").await, &[a.clone()])
            .await
            .unwrap();
        let message = store.list_for_batch(first.batch.token).await.unwrap().remove(0);
        assert_eq!(message.send_status, SendStatus::Succeeded);
        service
            .unsubscribe()
            .request_unsubscribe(message.token, UnsubscribeRequest::Confirm)
            .await
            .unwrap();
        assert!(!service.can_email(a.id).await.unwrap());

        let second = service
            .start_dispatch_from_existing(first.batch.token, "Second", &[a, b])
            .await
            .unwrap();
        assert_eq!(second.result, DispatchResult { initiated: 1, skipped: 1 });
    }

    #[tokio::test]
    async fn can_email_unknown_recipient_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store, 0);
        assert_matches!(
            service.can_email(new_token()).await,
            Err(CoreError::NotFound { .. })
        );
    }

    // -----------------------------------------------------------------------
    // Preview
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn preview_fields_uses_placeholders_for_missing_images() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store, 0);
        let draft = BatchFields {
            batch_title: "Draft".to_string(),
            ..Default::default()
        };

        let context = service
            .preview_fields(&draft, Recipient::preview_sample())
            .await
            .unwrap();

        assert_eq!(context.email_message.primary_image_url, DEFAULT_IMAGE_URL);
        assert_eq!(context.unsubscribe_link, PREVIEW_UNSUBSCRIBE_LINK);
        assert_eq!(context.customer.company.as_deref(), Some("Mock Company"));
    }

    #[tokio::test]
    async fn preview_batch_uses_stored_content() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone(), 0);
        let batch = service.create_batch(fields(&store, "Spring").await).await.unwrap();

        let context = service
            .preview_batch(batch.token, Recipient::preview_sample())
            .await
            .unwrap();

        assert_eq!(context.email_message.subject, "Spring launch");
        assert_eq!(
            context.email_message.alt_company_logo_url,
            "https://cdn.example.com/logo.png"
        );
        assert!(store.messages().await.is_empty());
    }
}
