//! Repository for the `images` table.

use bulkmail_core::image::NewImage;
use bulkmail_core::types::Token;
use sqlx::PgPool;

use crate::models::image::ImageRow;

const COLUMNS: &str = "token, description, url, category, archived, uploaded_at";

/// Provides persistence for reusable image resources.
pub struct ImageRepo;

impl ImageRepo {
    pub async fn create(pool: &PgPool, input: &NewImage) -> Result<ImageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO images (description, url, category) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(&input.description)
            .bind(&input.url)
            .bind(input.category.as_str())
            .fetch_one(pool)
            .await
    }

    /// Images whose token is in `tokens`. Archived images are included so
    /// that existing batches keep resolving.
    pub async fn find_many(pool: &PgPool, tokens: &[Token]) -> Result<Vec<ImageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE token = ANY($1)");
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(tokens)
            .fetch_all(pool)
            .await
    }

    /// List images, newest first.
    pub async fn list(pool: &PgPool, include_archived: bool) -> Result<Vec<ImageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE ($1 OR NOT archived) ORDER BY uploaded_at DESC"
        );
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(include_archived)
            .fetch_all(pool)
            .await
    }

    pub async fn set_archived(pool: &PgPool, token: Token, archived: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE images SET archived = $2 WHERE token = $1")
            .bind(token)
            .bind(archived)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
