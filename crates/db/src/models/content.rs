//! Content columns shared by `email_batches` and `email_messages`.

use bulkmail_core::batch::{BatchContent, EmailTemplate};
use bulkmail_core::error::CoreError;
use bulkmail_core::image::ImageRef;
use bulkmail_core::types::Token;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};

/// Content column list, in bind order for inserts.
pub const CONTENT_COLUMNS: &str = "template_file, subject, title, custom_message, \
     call_to_action_button_text, call_to_action_button_link, \
     company_logo_id, company_logo_url, alt_company_logo_id, alt_company_logo_url, \
     primary_image_id, primary_image_url";

/// The content columns of a batch or message row.
#[derive(Debug, Clone, FromRow)]
pub struct ContentRow {
    pub template_file: String,
    pub subject: Option<String>,
    pub title: Option<String>,
    pub custom_message: Option<String>,
    pub call_to_action_button_text: String,
    pub call_to_action_button_link: String,
    pub company_logo_id: Token,
    pub company_logo_url: String,
    pub alt_company_logo_id: Option<Token>,
    pub alt_company_logo_url: Option<String>,
    pub primary_image_id: Token,
    pub primary_image_url: String,
}

impl TryFrom<ContentRow> for BatchContent {
    type Error = CoreError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let alt_company_logo = match (row.alt_company_logo_id, row.alt_company_logo_url) {
            (Some(id), Some(url)) => Some(ImageRef { id, url }),
            (None, None) => None,
            _ => {
                return Err(CoreError::Internal(
                    "alt_company_logo id and url must be set together".to_string(),
                ))
            }
        };

        Ok(BatchContent {
            template: EmailTemplate::parse(&row.template_file)?,
            subject: row.subject,
            title: row.title,
            custom_message: row.custom_message,
            call_to_action_text: row.call_to_action_button_text,
            call_to_action_link: row.call_to_action_button_link,
            company_logo: ImageRef {
                id: row.company_logo_id,
                url: row.company_logo_url,
            },
            alt_company_logo,
            primary_image: ImageRef {
                id: row.primary_image_id,
                url: row.primary_image_url,
            },
        })
    }
}

/// Bind `content` onto `query` in [`CONTENT_COLUMNS`] order.
pub fn bind_content<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    content: &'q BatchContent,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(content.template.file_name())
        .bind(content.subject.as_deref())
        .bind(content.title.as_deref())
        .bind(content.custom_message.as_deref())
        .bind(content.call_to_action_text.as_str())
        .bind(content.call_to_action_link.as_str())
        .bind(content.company_logo.id)
        .bind(content.company_logo.url.as_str())
        .bind(content.alt_company_logo.as_ref().map(|image| image.id))
        .bind(content.alt_company_logo.as_ref().map(|image| image.url.as_str()))
        .bind(content.primary_image.id)
        .bind(content.primary_image.url.as_str())
}
