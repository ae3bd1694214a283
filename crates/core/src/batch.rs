//! Batch definitions, the message factory and batch cloning.
//!
//! A [`BatchDefinition`] is the reusable content of one mass send. Its
//! [`BatchContent`] is copied by value into every message it produces, so
//! later edits to the batch never reach messages that already exist.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::image::{ImageRef, ImageResource};
use crate::message::NewMessage;
use crate::recipient::Recipient;
use crate::types::{Timestamp, Token};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a batch's display name.
pub const MAX_BATCH_TITLE_LEN: usize = 50;

/// Maximum length of subject and call-to-action fields.
pub const MAX_SHORT_FIELD_LEN: usize = 256;

/// Call-to-action button text used when none is supplied.
pub const DEFAULT_CALL_TO_ACTION_TEXT: &str = "Learn More";

/// Call-to-action link used when none is supplied.
pub const DEFAULT_CALL_TO_ACTION_LINK: &str = "https://www.example.com/";

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// The closed set of email templates a batch can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmailTemplate {
    #[serde(rename = "simple.html")]
    Simple,
    #[default]
    #[serde(rename = "modern_standard.html")]
    ModernStandard,
}

impl EmailTemplate {
    /// Template file name, also the stored identifier.
    pub fn file_name(self) -> &'static str {
        match self {
            EmailTemplate::Simple => "simple.html",
            EmailTemplate::ModernStandard => "modern_standard.html",
        }
    }

    /// Parse a stored template identifier.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "simple.html" => Ok(EmailTemplate::Simple),
            "modern_standard.html" => Ok(EmailTemplate::ModernStandard),
            other => Err(CoreError::Validation(format!(
                "Unknown email template '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Content fields shared by batches and messages.
///
/// `alt_company_logo` stays `None` when unset; falling back to the primary
/// logo is a render-time concern only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchContent {
    pub template: EmailTemplate,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub custom_message: Option<String>,
    pub call_to_action_text: String,
    pub call_to_action_link: String,
    pub company_logo: ImageRef,
    pub alt_company_logo: Option<ImageRef>,
    pub primary_image: ImageRef,
}

impl BatchContent {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(subject) = &self.subject {
            validate_short_field("subject", subject)?;
        }
        validate_short_field("call_to_action_text", &self.call_to_action_text)?;
        validate_short_field("call_to_action_link", &self.call_to_action_link)?;
        Ok(())
    }
}

/// Validate a batch display name: non-blank, at most [`MAX_BATCH_TITLE_LEN`].
pub fn validate_batch_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Batch title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_BATCH_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Batch title must be at most {MAX_BATCH_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_short_field(field: &str, value: &str) -> Result<(), CoreError> {
    if value.chars().count() > MAX_SHORT_FIELD_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_SHORT_FIELD_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Batch definitions
// ---------------------------------------------------------------------------

/// A stored batch definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchDefinition {
    pub token: Token,
    pub batch_title: String,
    pub content: BatchContent,
    /// Recipients a message was created for in the last completed run.
    pub emails_initiated: i64,
    /// Recipients skipped as do-not-contact in the last completed run.
    pub emails_skipped: i64,
    pub archived: bool,
    pub created_at: Timestamp,
}

impl BatchDefinition {
    /// Build an unsaved message addressed to `recipient`.
    ///
    /// Content is copied by value and the batch back-reference is set.
    /// Nothing is persisted and no delivery happens here.
    pub fn create_message(&self, recipient: &Recipient) -> NewMessage {
        NewMessage {
            recipient_id: recipient.id,
            content: self.content.clone(),
            batch_token: Some(self.token),
        }
    }

    /// Build an unsaved copy of this batch under a new title.
    ///
    /// The copy carries every content field; aggregate counters are not
    /// carried and start at zero once the copy is stored.
    pub fn clone_definition(&self, new_title: &str) -> Result<NewBatch, CoreError> {
        validate_batch_title(new_title)?;
        Ok(NewBatch {
            batch_title: new_title.to_string(),
            content: self.content.clone(),
        })
    }
}

/// An unsaved batch definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBatch {
    pub batch_title: String,
    pub content: BatchContent,
}

impl NewBatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_batch_title(&self.batch_title)?;
        self.content.validate()
    }
}

// ---------------------------------------------------------------------------
// Flat field map
// ---------------------------------------------------------------------------

/// The flat field map submitted by the admin form.
///
/// Image fields carry image tokens; they are resolved against stored
/// [`ImageResource`]s by [`BatchFields::into_new_batch`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchFields {
    pub batch_title: String,
    pub template_file: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub custom_content: Option<String>,
    pub call_to_action_button_text: Option<String>,
    pub call_to_action_button_link: Option<String>,
    pub company_logo: Option<Token>,
    pub alt_company_logo: Option<Token>,
    pub primary_image: Option<Token>,
}

impl BatchFields {
    /// Every image token the fields refer to.
    pub fn image_ids(&self) -> Vec<Token> {
        [self.company_logo, self.alt_company_logo, self.primary_image]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Template named by the fields, or the default template.
    pub fn template(&self) -> Result<EmailTemplate, CoreError> {
        match non_blank(&self.template_file) {
            Some(name) => EmailTemplate::parse(&name),
            None => Ok(EmailTemplate::default()),
        }
    }

    pub fn call_to_action_text(&self) -> String {
        non_blank(&self.call_to_action_button_text)
            .unwrap_or_else(|| DEFAULT_CALL_TO_ACTION_TEXT.to_string())
    }

    pub fn call_to_action_link(&self) -> String {
        non_blank(&self.call_to_action_button_link)
            .unwrap_or_else(|| DEFAULT_CALL_TO_ACTION_LINK.to_string())
    }

    /// Turn the field map into a validated, unsaved batch.
    ///
    /// `images` must hold the stored images for [`Self::image_ids`]; a
    /// missing required image or an unknown image token is a validation
    /// error.
    pub fn into_new_batch(self, images: &[ImageResource]) -> Result<NewBatch, CoreError> {
        let company_logo = self
            .company_logo
            .ok_or_else(|| CoreError::Validation("company_logo is required".to_string()))?;
        let primary_image = self
            .primary_image
            .ok_or_else(|| CoreError::Validation("primary_image is required".to_string()))?;

        let content = BatchContent {
            template: self.template()?,
            subject: non_blank(&self.subject),
            title: non_blank(&self.title),
            custom_message: non_blank(&self.custom_content),
            call_to_action_text: self.call_to_action_text(),
            call_to_action_link: self.call_to_action_link(),
            company_logo: resolve_image("company_logo", company_logo, images)?,
            alt_company_logo: self
                .alt_company_logo
                .map(|id| resolve_image("alt_company_logo", id, images))
                .transpose()?,
            primary_image: resolve_image("primary_image", primary_image, images)?,
        };

        let batch = NewBatch {
            batch_title: self.batch_title,
            content,
        };
        batch.validate()?;
        Ok(batch)
    }
}

/// Look up `id` among `images`, labelling a miss with `field`.
pub fn resolve_image(
    field: &str,
    id: Token,
    images: &[ImageResource],
) -> Result<ImageRef, CoreError> {
    images
        .iter()
        .find(|image| image.token == id)
        .map(ImageResource::to_ref)
        .ok_or_else(|| CoreError::Validation(format!("{field} refers to unknown image {id}")))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
