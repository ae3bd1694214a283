//! Dispatch outcome and per-batch statistics.

use serde::Serialize;

/// Outcome of one dispatch run.
///
/// `initiated` counts recipients a message was created for, whether or not
/// delivery succeeded. Per-message outcomes live on the messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DispatchResult {
    pub initiated: i64,
    pub skipped: i64,
}

impl DispatchResult {
    /// Human-readable summary shown to staff after a run.
    pub fn summary(&self) -> String {
        format!(
            "We reached {} prospects with this email! {} did not receive this email because they have unsubscribed",
            self.initiated, self.skipped
        )
    }
}

/// Derived counts for a stored batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchStats {
    /// Messages whose delivery succeeded.
    pub emails_sent: i64,
    /// Messages the recipient used to unsubscribe.
    pub unsubscribe_count: i64,
}
