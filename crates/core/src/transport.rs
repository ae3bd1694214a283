//! Outbound mail transport seam.

use async_trait::async_trait;

use crate::render::RenderContext;

/// Error raised by a mail transport.
///
/// The delivery trigger absorbs these into a failed send status; they never
/// propagate out of a dispatch run.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport rejected the message: {0}")]
    Rejected(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message could not be built: {0}")]
    Build(String),

    #[error("Template rendering failed: {0}")]
    Render(String),

    #[error("Send timed out after {0} seconds")]
    Timeout(u64),

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// One message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    /// Display name of the "From" mailbox. Quoting is left to the transport.
    pub sender_name: String,
    pub sender_address: String,
    pub to: Vec<String>,
    pub context: RenderContext,
}

impl OutgoingMail {
    pub fn subject(&self) -> &str {
        &self.context.email_message.subject
    }
}

/// Delivers rendered mail.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Render and send `mail`, returning how many messages were accepted.
    async fn send(&self, mail: OutgoingMail) -> Result<usize, TransportError>;
}
