//! The two-step unsubscribe protocol.
//!
//! A message moves from pending (`unsubscribed = false`) to unsubscribed on
//! confirmation, and never back.

use std::sync::Arc;

use bulkmail_core::error::CoreError;
use bulkmail_core::message::Message;
use bulkmail_core::recipient::Recipient;
use bulkmail_core::store::{MessageStore, RecipientDirectory};
use bulkmail_core::types::Token;
use serde::Serialize;

use crate::config::DispatchConfig;

/// What the recipient asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsubscribeRequest {
    /// Show the unsubscribe page.
    View,
    /// Confirm the unsubscribe.
    Confirm,
    /// Anything else; carries the request method for logging.
    Other(String),
}

impl UnsubscribeRequest {
    /// Classify an HTTP method: `GET` views, `POST` confirms.
    pub fn from_method(method: &str) -> Self {
        match method {
            "GET" => Self::View,
            "POST" => Self::Confirm,
            other => Self::Other(other.to_string()),
        }
    }
}

/// What the unsubscribe pages show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsubscribeView {
    pub message_token: Token,
    pub customer: Recipient,
    pub unsubscribed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnsubscribeOutcome {
    /// The page was viewed; nothing changed.
    Viewed(UnsubscribeView),
    /// The message is now unsubscribed. The recipient should be sent on to
    /// `redirect_to`.
    Confirmed {
        view: UnsubscribeView,
        redirect_to: String,
    },
}

pub struct UnsubscribeHandler {
    messages: Arc<dyn MessageStore>,
    recipients: Arc<dyn RecipientDirectory>,
    config: Arc<DispatchConfig>,
}

impl UnsubscribeHandler {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        recipients: Arc<dyn RecipientDirectory>,
        config: Arc<DispatchConfig>,
    ) -> Self {
        Self {
            messages,
            recipients,
            config,
        }
    }

    /// Handle a request on a message's unsubscribe link.
    ///
    /// Unknown tokens are [`CoreError::NotFound`] for every request kind.
    /// Confirming twice succeeds both times.
    pub async fn request_unsubscribe(
        &self,
        message_token: Token,
        request: UnsubscribeRequest,
    ) -> Result<UnsubscribeOutcome, CoreError> {
        let message = self.load(message_token).await?;

        match request {
            UnsubscribeRequest::View => Ok(UnsubscribeOutcome::Viewed(self.view(message).await?)),
            UnsubscribeRequest::Confirm => {
                if !self.messages.mark_unsubscribed(message_token).await? {
                    return Err(CoreError::not_found("EmailMessage", message_token));
                }
                tracing::info!(
                    message_token = %message_token,
                    recipient_id = %message.recipient_id,
                    "Recipient unsubscribed"
                );
                let view = self
                    .view(Message {
                        unsubscribed: true,
                        ..message
                    })
                    .await?;
                Ok(UnsubscribeOutcome::Confirmed {
                    view,
                    redirect_to: self.confirmed_link(message_token),
                })
            }
            UnsubscribeRequest::Other(method) => Err(not_allowed(&method)),
        }
    }

    /// Handle a request on the confirmation page. Only views are allowed.
    pub async fn confirmed(
        &self,
        message_token: Token,
        request: UnsubscribeRequest,
    ) -> Result<UnsubscribeView, CoreError> {
        let message = self.load(message_token).await?;
        match request {
            UnsubscribeRequest::View => self.view(message).await,
            UnsubscribeRequest::Confirm => Err(not_allowed("POST")),
            UnsubscribeRequest::Other(method) => Err(not_allowed(&method)),
        }
    }

    /// Where a confirmed unsubscribe redirects to.
    pub fn confirmed_link(&self, message_token: Token) -> String {
        format!("{}/confirmed", self.config.unsubscribe_link(message_token))
    }

    async fn load(&self, message_token: Token) -> Result<Message, CoreError> {
        self.messages
            .find(message_token)
            .await?
            .ok_or_else(|| CoreError::not_found("EmailMessage", message_token))
    }

    async fn view(&self, message: Message) -> Result<UnsubscribeView, CoreError> {
        let customer = self
            .recipients
            .find(message.recipient_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", message.recipient_id))?;
        Ok(UnsubscribeView {
            message_token: message.token,
            customer,
            unsubscribed: message.unsubscribed,
        })
    }
}

fn not_allowed(method: &str) -> CoreError {
    CoreError::NotAllowed(format!("{method} is not supported on unsubscribe links"))
}
