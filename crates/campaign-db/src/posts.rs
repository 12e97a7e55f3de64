//! Database operations for the `campaign_posts` table.

use campaign_core::FinalPost;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `campaign_posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub case_study_id: Uuid,
    pub title: String,
    pub content: String,
    pub channel: String,
    pub scheduled_at: DateTime<Utc>,
    pub image_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insert a whole campaign batch in one statement inside one transaction.
///
/// Either every post is written or none is. Returns the number of rows
/// inserted; an empty batch is a no-op returning `0`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction or insert fails.
pub async fn bulk_create_posts(pool: &PgPool, posts: &[FinalPost]) -> Result<u64, DbError> {
    if posts.is_empty() {
        return Ok(0);
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let mut ids: Vec<Uuid> = Vec::with_capacity(posts.len());
    let mut case_study_ids: Vec<Uuid> = Vec::with_capacity(posts.len());
    let mut titles: Vec<String> = Vec::with_capacity(posts.len());
    let mut contents: Vec<String> = Vec::with_capacity(posts.len());
    let mut channels: Vec<String> = Vec::with_capacity(posts.len());
    let mut scheduled: Vec<DateTime<Utc>> = Vec::with_capacity(posts.len());
    let mut image_ids: Vec<Option<Uuid>> = Vec::with_capacity(posts.len());

    for post in posts {
        ids.push(post.id);
        case_study_ids.push(post.case_study_id);
        titles.push(post.title.clone());
        contents.push(post.content.clone());
        channels.push(post.channel.to_string());
        scheduled.push(post.scheduled_at);
        image_ids.push(post.image_id);
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO campaign_posts \
             (id, case_study_id, title, content, channel, scheduled_at, image_id) \
         SELECT * FROM UNNEST(\
              $1::uuid[], $2::uuid[], $3::text[], $4::text[], $5::text[], \
              $6::timestamptz[], $7::uuid[])",
    )
    .bind(&ids)
    .bind(&case_study_ids)
    .bind(&titles)
    .bind(&contents)
    .bind(&channels)
    .bind(&scheduled)
    .bind(&image_ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(result.rows_affected())
}

/// Lists the persisted posts for a case study, ordered by channel and then
/// publication time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scheduled_posts(
    pool: &PgPool,
    case_study_id: Uuid,
) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(
        "SELECT id, case_study_id, title, content, channel, scheduled_at, image_id, created_at \
         FROM campaign_posts \
         WHERE case_study_id = $1 \
         ORDER BY channel, scheduled_at",
    )
    .bind(case_study_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
