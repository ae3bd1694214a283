//! Per-recipient message records.

use serde::{Serialize, Serializer};

use crate::batch::BatchContent;
use crate::types::{Timestamp, Token};

/// Outcome of the single automatic delivery attempt for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendStatus {
    #[default]
    NotAttempted,
    Succeeded,
    Failed,
}

impl SendStatus {
    /// Map the stored nullable flag (`NULL` = not yet attempted).
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => SendStatus::NotAttempted,
            Some(true) => SendStatus::Succeeded,
            Some(false) => SendStatus::Failed,
        }
    }

    pub fn as_flag(self) -> Option<bool> {
        match self {
            SendStatus::NotAttempted => None,
            SendStatus::Succeeded => Some(true),
            SendStatus::Failed => Some(false),
        }
    }
}

impl Serialize for SendStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_flag().serialize(serializer)
    }
}

/// A stored message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub token: Token,
    pub recipient_id: Token,
    pub content: BatchContent,
    #[serde(rename = "send_succeeded")]
    pub send_status: SendStatus,
    /// Monotonic: once `true` it never returns to `false`.
    pub unsubscribed: bool,
    pub batch_token: Option<Token>,
    pub created_at: Timestamp,
}

/// An unsaved message, as built by `BatchDefinition::create_message`.
///
/// Storing it is the only thing that leads to delivery, and the store never
/// delivers on its own: the caller fires the delivery trigger explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub recipient_id: Token,
    pub content: BatchContent,
    pub batch_token: Option<Token>,
}
