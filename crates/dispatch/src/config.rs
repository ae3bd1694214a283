//! Engine configuration: sender identity, unsubscribe link base and the
//! optional per-message send timeout.

use std::time::Duration;

use bulkmail_core::error::CoreError;
use bulkmail_core::recipient::validate_email_address;
use bulkmail_core::types::Token;

/// Display name used in the "From" header when `MAIL_SENDER_NAME` is unset.
pub const DEFAULT_SENDER_NAME: &str = "Bulkmail";

/// Engine configuration, passed explicitly to the coordinator, the delivery
/// trigger and the unsubscribe handler.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    sender_address: String,
    sender_name: String,
    unsubscribe_route_base: String,
    send_timeout: Option<Duration>,
}

impl DispatchConfig {
    /// Build a configuration, rejecting a blank or malformed sender address
    /// and a blank unsubscribe route base.
    pub fn new(
        sender_address: impl Into<String>,
        unsubscribe_route_base: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let sender_address = sender_address.into().trim().to_string();
        let unsubscribe_route_base = unsubscribe_route_base.into().trim().to_string();

        if sender_address.is_empty() {
            return Err(CoreError::Configuration(
                "MAIL_SENDER_ADDRESS must be set".to_string(),
            ));
        }
        validate_email_address("MAIL_SENDER_ADDRESS", &sender_address)
            .map_err(|e| CoreError::Configuration(e.to_string()))?;
        if unsubscribe_route_base.is_empty() {
            return Err(CoreError::Configuration(
                "UNSUBSCRIBE_ROUTE_BASE must be set".to_string(),
            ));
        }

        Ok(Self {
            sender_address,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            unsubscribe_route_base: unsubscribe_route_base.trim_end_matches('/').to_string(),
            send_timeout: None,
        })
    }

    /// Set the "From" display name. Blank names keep the default; names
    /// containing control characters cannot go into a mail header.
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let name = name.trim();
        if name.chars().any(char::is_control) {
            return Err(CoreError::Configuration(
                "MAIL_SENDER_NAME must not contain control characters".to_string(),
            ));
        }
        if !name.is_empty() {
            self.sender_name = name.to_string();
        }
        Ok(self)
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default    |
    /// |--------------------------|----------|------------|
    /// | `MAIL_SENDER_ADDRESS`    | yes      |            |
    /// | `UNSUBSCRIBE_ROUTE_BASE` | yes      |            |
    /// | `MAIL_SENDER_NAME`       | no       | `Bulkmail` |
    /// | `MAIL_SEND_TIMEOUT_SECS` | no       | no timeout |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let mut config = Self::new(
            lookup("MAIL_SENDER_ADDRESS").unwrap_or_default(),
            lookup("UNSUBSCRIBE_ROUTE_BASE").unwrap_or_default(),
        )?;

        if let Some(name) = lookup("MAIL_SENDER_NAME") {
            config = config.with_sender_name(name)?;
        }
        if let Some(raw) = lookup("MAIL_SEND_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CoreError::Configuration(format!(
                    "MAIL_SEND_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            if secs > 0 {
                config = config.with_send_timeout(Duration::from_secs(secs));
            }
        }
        Ok(config)
    }

    pub fn sender_address(&self) -> &str {
        &self.sender_address
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Link a recipient follows to unsubscribe via `message_token`.
    pub fn unsubscribe_link(&self, message_token: Token) -> String {
        format!("{}/{}", self.unsubscribe_route_base, message_token)
    }

    pub fn send_timeout(&self) -> Option<Duration> {
        self.send_timeout
    }
}
