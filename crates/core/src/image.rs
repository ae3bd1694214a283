//! Reusable image resources referenced by batches and messages.
//!
//! Asset storage itself is external; an image here is only a stable token,
//! a public URL and some labelling used to pick images for a batch.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Timestamp, Token};

/// Maximum length of an image description.
pub const MAX_DESCRIPTION_LEN: usize = 512;

/// What an image is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageCategory {
    Internal,
    Customer,
    #[default]
    Marketing,
}

impl ImageCategory {
    /// Database / wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageCategory::Internal => "Internal",
            ImageCategory::Customer => "Customer",
            ImageCategory::Marketing => "Marketing",
        }
    }

    /// Parse a stored label.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "Internal" => Ok(ImageCategory::Internal),
            "Customer" => Ok(ImageCategory::Customer),
            "Marketing" => Ok(ImageCategory::Marketing),
            other => Err(CoreError::Validation(format!(
                "Unknown image category '{other}'"
            ))),
        }
    }
}

/// A stored image resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageResource {
    pub token: Token,
    pub description: String,
    pub url: String,
    pub category: ImageCategory,
    pub archived: bool,
    pub uploaded_at: Timestamp,
}

impl ImageResource {
    /// The by-value reference copied into batches and messages.
    pub fn to_ref(&self) -> ImageRef {
        ImageRef {
            id: self.token,
            url: self.url.clone(),
        }
    }
}

/// DTO for registering an image.
#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub category: ImageCategory,
}

impl NewImage {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.description.trim().is_empty() {
            return Err(CoreError::Validation(
                "Image description must not be empty".to_string(),
            ));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Image description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        if self.url.trim().is_empty() {
            return Err(CoreError::Validation(
                "Image url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A by-value image reference: the image token plus the URL it resolved to
/// when the owning batch or message was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: Token,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_label() {
        for category in [
            ImageCategory::Internal,
            ImageCategory::Customer,
            ImageCategory::Marketing,
        ] {
            assert_eq!(ImageCategory::parse(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(ImageCategory::parse("Stock").is_err());
    }

    #[test]
    fn blank_description_is_rejected() {
        let image = NewImage {
            description: "  ".to_string(),
            url: "https://cdn.example.com/logo.png".to_string(),
            category: ImageCategory::Marketing,
        };
        assert!(image.validate().is_err());
    }
}
