//! Database operations for the `generated_images` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `generated_images` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageRow {
    pub id: Uuid,
    pub url: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

/// Records a stored image and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_image_record(pool: &PgPool, url: &str, prompt: &str) -> Result<Uuid, DbError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO generated_images (id, url, prompt) \
         VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(url)
    .bind(prompt)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetches one image record.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_image(pool: &PgPool, id: Uuid) -> Result<ImageRow, DbError> {
    sqlx::query_as::<_, ImageRow>(
        "SELECT id, url, prompt, created_at FROM generated_images WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
