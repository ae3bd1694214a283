//! Image resource rows.

use bulkmail_core::error::CoreError;
use bulkmail_core::image::{ImageCategory, ImageResource};
use bulkmail_core::types::{Timestamp, Token};
use sqlx::FromRow;

/// A row from the `images` table.
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub token: Token,
    pub description: String,
    pub url: String,
    pub category: String,
    pub archived: bool,
    pub uploaded_at: Timestamp,
}

impl TryFrom<ImageRow> for ImageResource {
    type Error = CoreError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        Ok(ImageResource {
            token: row.token,
            description: row.description,
            url: row.url,
            category: ImageCategory::parse(&row.category)?,
            archived: row.archived,
            uploaded_at: row.uploaded_at,
        })
    }
}
