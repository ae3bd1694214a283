//! Delivery of a single freshly stored message.

use std::sync::Arc;

use bulkmail_core::message::{Message, SendStatus};
use bulkmail_core::recipient::Recipient;
use bulkmail_core::render::{EmailView, RenderContext};
use bulkmail_core::store::{MessageStore, StoreResult};
use bulkmail_core::transport::{MailTransport, OutgoingMail, TransportError};

use crate::config::DispatchConfig;
use crate::eligibility::EligibilityFilter;

/// Sends a message exactly once, right after it was first stored, and
/// records the outcome on it.
///
/// Transport failures end up as [`SendStatus::Failed`] on the message and
/// are not returned. Only store failures propagate.
#[derive(Clone)]
pub struct DeliveryTrigger {
    messages: Arc<dyn MessageStore>,
    eligibility: EligibilityFilter,
    transport: Arc<dyn MailTransport>,
    config: Arc<DispatchConfig>,
}

impl DeliveryTrigger {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        transport: Arc<dyn MailTransport>,
        config: Arc<DispatchConfig>,
    ) -> Self {
        Self {
            eligibility: EligibilityFilter::new(Arc::clone(&messages)),
            messages,
            transport,
            config,
        }
    }

    /// Deliver `message` to `recipient` and persist the resulting status.
    ///
    /// Suppression is checked again here; a recipient who unsubscribed after
    /// the coordinator's check gets no transport call.
    pub async fn fire(&self, message: &Message, recipient: &Recipient) -> StoreResult<SendStatus> {
        if self.eligibility.is_suppressed(recipient.id).await? {
            tracing::info!(
                message_token = %message.token,
                recipient_id = %recipient.id,
                "Recipient unsubscribed before delivery, not sending"
            );
            self.messages
                .record_send_status(message.token, SendStatus::Failed)
                .await?;
            return Ok(SendStatus::Failed);
        }

        let mail = OutgoingMail {
            sender_name: self.config.sender_name().to_string(),
            sender_address: self.config.sender_address().to_string(),
            to: vec![recipient.email.clone()],
            context: RenderContext::new(
                message.content.template,
                recipient.clone(),
                EmailView::from_content(&message.content),
                self.config.unsubscribe_link(message.token),
            ),
        };

        tracing::info!(
            message_token = %message.token,
            recipient_id = %recipient.id,
            template = message.content.template.file_name(),
            "Sending email"
        );

        let status = match self.send(mail).await {
            Ok(1) => SendStatus::Succeeded,
            Ok(accepted) => {
                tracing::warn!(
                    message_token = %message.token,
                    accepted,
                    "Transport did not accept exactly one message"
                );
                SendStatus::Failed
            }
            Err(e) => {
                tracing::warn!(
                    message_token = %message.token,
                    recipient_id = %recipient.id,
                    error = %e,
                    "Email delivery failed"
                );
                SendStatus::Failed
            }
        };

        self.messages
            .record_send_status(message.token, status)
            .await?;
        Ok(status)
    }

    async fn send(&self, mail: OutgoingMail) -> Result<usize, TransportError> {
        match self.config.send_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.transport.send(mail))
                .await
                .map_err(|_| TransportError::Timeout(limit.as_secs()))?,
            None => self.transport.send(mail).await,
        }
    }
}
