//! Do-not-contact check.

use std::sync::Arc;

use bulkmail_core::store::{MessageStore, StoreResult};
use bulkmail_core::types::Token;

/// Answers whether a recipient must be excluded from sends.
///
/// Suppression is derived on every call from the recipient's messages; it
/// is never cached, so an unsubscribe is visible to the very next check.
#[derive(Clone)]
pub struct EligibilityFilter {
    messages: Arc<dyn MessageStore>,
}

impl EligibilityFilter {
    pub fn new(messages: Arc<dyn MessageStore>) -> Self {
        Self { messages }
    }

    /// `true` if any message to this recipient has been used to unsubscribe.
    pub async fn is_suppressed(&self, recipient_id: Token) -> StoreResult<bool> {
        self.messages.has_unsubscribed(recipient_id).await
    }
}
