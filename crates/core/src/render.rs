//! Render context handed to the template renderer.
//!
//! Image fallbacks are resolved here, at render time, and nowhere else:
//! stored batches and messages keep exactly the references they were given.

use serde::Serialize;

use crate::batch::{BatchContent, BatchFields, EmailTemplate};
use crate::error::CoreError;
use crate::image::{ImageRef, ImageResource};
use crate::recipient::Recipient;

/// Placeholder image used when a previewed draft has no image selected.
pub const DEFAULT_IMAGE_URL: &str = "https://cdn0.iconfinder.com/data/icons/feather/96/no-512.png";

/// Unsubscribe link embedded in previews, which are never delivered.
pub const PREVIEW_UNSUBSCRIBE_LINK: &str = "#unsubscribe";

/// Template-facing view of a message's content with image URLs resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailView {
    pub subject: String,
    pub title: String,
    pub custom_message: String,
    pub call_to_action_button_text: String,
    pub call_to_action_button_link: String,
    pub company_logo_url: String,
    /// The alternate logo, or the primary logo when none was chosen.
    pub alt_company_logo_url: String,
    pub primary_image_url: String,
}

impl EmailView {
    /// View of stored content (a message or a batch).
    pub fn from_content(content: &BatchContent) -> Self {
        Self::build(
            content.subject.as_deref(),
            content.title.as_deref(),
            content.custom_message.as_deref(),
            &content.call_to_action_text,
            &content.call_to_action_link,
            Some(&content.company_logo),
            content.alt_company_logo.as_ref(),
            Some(&content.primary_image),
        )
    }

    /// View of an unsaved form draft, for previews.
    ///
    /// Unlike [`BatchFields::into_new_batch`], missing images are allowed and
    /// render as [`DEFAULT_IMAGE_URL`]. Unknown image tokens are still
    /// rejected.
    pub fn from_fields(fields: &BatchFields, images: &[ImageResource]) -> Result<Self, CoreError> {
        let lookup = |field: &str, id: Option<crate::types::Token>| {
            id.map(|id| crate::batch::resolve_image(field, id, images))
                .transpose()
        };
        let company_logo = lookup("company_logo", fields.company_logo)?;
        let alt_company_logo = lookup("alt_company_logo", fields.alt_company_logo)?;
        let primary_image = lookup("primary_image", fields.primary_image)?;

        Ok(Self::build(
            fields.subject.as_deref(),
            fields.title.as_deref(),
            fields.custom_content.as_deref(),
            &fields.call_to_action_text(),
            &fields.call_to_action_link(),
            company_logo.as_ref(),
            alt_company_logo.as_ref(),
            primary_image.as_ref(),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        subject: Option<&str>,
        title: Option<&str>,
        custom_message: Option<&str>,
        call_to_action_text: &str,
        call_to_action_link: &str,
        company_logo: Option<&ImageRef>,
        alt_company_logo: Option<&ImageRef>,
        primary_image: Option<&ImageRef>,
    ) -> Self {
        let company_logo_url = company_logo
            .map(|image| image.url.clone())
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());
        let alt_company_logo_url = alt_company_logo
            .map(|image| image.url.clone())
            .unwrap_or_else(|| company_logo_url.clone());

        Self {
            subject: subject.unwrap_or_default().to_string(),
            title: title.unwrap_or_default().to_string(),
            custom_message: custom_message.unwrap_or_default().to_string(),
            call_to_action_button_text: call_to_action_text.to_string(),
            call_to_action_button_link: call_to_action_link.to_string(),
            company_logo_url,
            alt_company_logo_url,
            primary_image_url: primary_image
                .map(|image| image.url.clone())
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        }
    }
}

/// Everything a template sees: the customer, the message and the link the
/// customer follows to unsubscribe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderContext {
    #[serde(skip)]
    pub template: EmailTemplate,
    pub customer: Recipient,
    pub email_message: EmailView,
    pub unsubscribe_link: String,
}

impl RenderContext {
    pub fn new(
        template: EmailTemplate,
        customer: Recipient,
        email_message: EmailView,
        unsubscribe_link: impl Into<String>,
    ) -> Self {
        Self {
            template,
            customer,
            email_message,
            unsubscribe_link: unsubscribe_link.into(),
        }
    }

    /// Context for previewing stored content with the placeholder link.
    pub fn preview(content: &BatchContent, customer: Recipient) -> Self {
        Self::new(
            content.template,
            customer,
            EmailView::from_content(content),
            PREVIEW_UNSUBSCRIBE_LINK,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::new_token;

    fn image_ref(name: &str) -> ImageRef {
        ImageRef {
            id: new_token(),
            url: format!("https://cdn.example.com/{name}.png"),
        }
    }

    fn content(alt: Option<ImageRef>) -> BatchContent {
        BatchContent {
            template: EmailTemplate::Simple,
            subject: Some("Hello".to_string()),
            title: None,
            custom_message: None,
            call_to_action_text: "Go".to_string(),
            call_to_action_link: "https://acme.test".to_string(),
            company_logo: image_ref("logo"),
            alt_company_logo: alt,
            primary_image: image_ref("hero"),
        }
    }

    #[test]
    fn unset_alt_logo_renders_primary_logo() {
        let view = EmailView::from_content(&content(None));
        assert_eq!(view.alt_company_logo_url, "https://cdn.example.com/logo.png");
    }

    #[test]
    fn set_alt_logo_is_used() {
        let view = EmailView::from_content(&content(Some(image_ref("alt"))));
        assert_eq!(view.alt_company_logo_url, "https://cdn.example.com/alt.png");
    }

    #[test]
    fn draft_without_images_uses_placeholder() {
        let fields = BatchFields {
            batch_title: "Draft".to_string(),
            ..Default::default()
        };
        let view = EmailView::from_fields(&fields, &[]).unwrap();
        assert_eq!(view.company_logo_url, DEFAULT_IMAGE_URL);
        assert_eq!(view.alt_company_logo_url, DEFAULT_IMAGE_URL);
        assert_eq!(view.primary_image_url, DEFAULT_IMAGE_URL);
        assert_eq!(view.call_to_action_button_text, "Learn More");
    }

    #[test]
    fn draft_with_unknown_image_is_rejected() {
        let fields = BatchFields {
            batch_title: "Draft".to_string(),
            primary_image: Some(new_token()),
            ..Default::default()
        };
        assert!(EmailView::from_fields(&fields, &[]).is_err());
    }

    #[test]
    fn context_serializes_template_facing_fields() {
        let context = RenderContext::preview(&content(None), Recipient::preview_sample());
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["customer"]["first_name"], "John");
        assert_eq!(json["email_message"]["subject"], "Hello");
        assert_eq!(json["unsubscribe_link"], PREVIEW_UNSUBSCRIBE_LINK);
        assert!(json.get("template").is_none());
    }
}
