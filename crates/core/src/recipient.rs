//! Recipients are CRM customer records, referenced but not owned here.
//!
//! Do-not-contact status is never stored on a recipient; it is derived from
//! the recipient's message history (see `EligibilityFilter` in the dispatch
//! crate).

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::types::Token;

/// A customer that can receive mass email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: Token,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub company: Option<String>,
}

impl Recipient {
    /// The stand-in customer used when previewing a batch.
    pub fn preview_sample() -> Self {
        Self {
            id: Token::nil(),
            email: "john@smith.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            company: Some("Mock Company".to_string()),
        }
    }
}

/// Validate an email address, labelling the error with `field`.
pub fn validate_email_address(field: &str, address: &str) -> Result<(), CoreError> {
    if !address.validate_email() {
        return Err(CoreError::Validation(format!(
            "{field} '{address}' is not a valid email address"
        )));
    }
    Ok(())
}
