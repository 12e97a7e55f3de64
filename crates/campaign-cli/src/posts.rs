//! Read-only listing of stored campaign posts.

use uuid::Uuid;

/// Show the stored posts for a case study, grouped by channel in
/// publication order, with the stored image URL when a post has one.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub(crate) async fn run_posts(pool: &sqlx::PgPool, case_study_id: Uuid) -> anyhow::Result<()> {
    let posts = campaign_db::list_scheduled_posts(pool, case_study_id).await?;

    if posts.is_empty() {
        println!("no posts found for case study {case_study_id}; run `campaign-cli run` first");
        return Ok(());
    }

    println!("{:<14}{:<18}{:<54}IMAGE", "CHANNEL", "SCHEDULED (UTC)", "TITLE");
    for post in &posts {
        let scheduled = post.scheduled_at.format("%Y-%m-%d %H:%M").to_string();
        let title_display = if post.title.chars().count() > 50 {
            format!("{}...", post.title.chars().take(50).collect::<String>())
        } else {
            post.title.clone()
        };
        let image = match post.image_id {
            Some(id) => match campaign_db::get_image(pool, id).await {
                Ok(row) => row.url,
                Err(campaign_db::DbError::NotFound) => format!("missing image {id}"),
                Err(e) => return Err(e.into()),
            },
            None => "-".to_string(),
        };
        println!(
            "{:<14}{:<18}{:<54}{}",
            post.channel, scheduled, title_display, image
        );
    }
    println!("\n{} post(s)", posts.len());

    Ok(())
}
