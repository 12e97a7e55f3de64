//! `run` and `preview` handlers.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use campaign_clients::{BlobClient, GenerationClient};
use campaign_core::{AppConfig, CampaignRequest, ChannelId, FinalPost};
use campaign_pipeline::{
    CampaignPipeline, Collaborators, DateScheduler, PgPostStore, PipelineSettings, RunOutcome,
};
use chrono::{NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

/// Run the full pipeline for a campaign file and print the resulting
/// schedule. Ctrl-C cancels the run; nothing is written after that.
///
/// # Errors
///
/// Returns an error if the campaign file is invalid, a client cannot be
/// built, or the run fails.
pub(crate) async fn run_campaign(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    campaign_path: &Path,
) -> anyhow::Result<()> {
    let request = campaign_core::load_campaign(campaign_path)?;

    let generation = GenerationClient::from_app_config(config)
        .context("failed to build generation client")?;
    let blobs = BlobClient::new(
        &config.blob_base_url,
        config.blob_token.as_deref(),
        config.request_timeout_secs,
    )
    .context("failed to build blob client")?;
    let collaborators = Collaborators::from_clients(
        Arc::new(generation),
        Arc::new(blobs),
        PgPostStore::new(pool.clone()),
    );
    let pipeline = CampaignPipeline::new(collaborators, PipelineSettings::from_app_config(config));

    let token = CancellationToken::new();
    let watcher = tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; cancelling campaign run");
                token.cancel();
            }
        }
    });

    let outcome = pipeline.run(&request, &token).await;
    watcher.abort();

    match outcome? {
        RunOutcome::NoPostsToCreate => {
            println!(
                "no posts to create for case study {}",
                request.case_study.id
            );
        }
        RunOutcome::Created(report) => {
            print_posts(&report.posts);
            println!(
                "\ncreated {} post(s) from {} planned: {} with images, {} without",
                report.posts.len(),
                report.planned,
                report.with_images,
                report.image_failures
            );
        }
    }

    Ok(())
}

/// Print the slots each channel would receive. Offline: no configuration,
/// database or external service is needed.
///
/// # Errors
///
/// Returns an error if the campaign file cannot be loaded.
pub(crate) fn run_preview(campaign_path: &Path, start: Option<NaiveDate>) -> anyhow::Result<()> {
    let request = campaign_core::load_campaign(campaign_path)?;
    let start = start.unwrap_or_else(|| Utc::now().date_naive());
    let schedule = preview_schedule(&request, start);

    let cadence = request.spec.cadence();
    println!(
        "{} campaign, {} week(s), {} post(s) per week per channel, starting after {start}",
        request.spec.campaign_type, request.spec.weeks, cadence.posts_per_week
    );
    for (channel, slots) in &schedule {
        println!("\n{channel}");
        for (index, slot) in slots.iter().enumerate() {
            println!(
                "  {:>3}  {}  {:02}:00 UTC",
                index + 1,
                slot.date.format("%a %Y-%m-%d"),
                slot.hour
            );
        }
    }

    Ok(())
}

fn preview_schedule(
    request: &CampaignRequest,
    start: NaiveDate,
) -> BTreeMap<ChannelId, Vec<campaign_pipeline::ScheduledSlot>> {
    let mut scheduler = DateScheduler::new(request.spec.cadence(), start);
    let per_channel = request.spec.posts_per_channel();
    request
        .spec
        .channels
        .iter()
        .map(|channel| (channel.clone(), scheduler.take(channel, per_channel)))
        .collect()
}

fn print_posts(posts: &[FinalPost]) {
    println!("{:<14}{:<18}{:<7}TITLE", "CHANNEL", "SCHEDULED (UTC)", "IMAGE");
    for post in posts {
        let title = if post.title.chars().count() > 50 {
            format!("{}...", post.title.chars().take(50).collect::<String>())
        } else {
            post.title.clone()
        };
        println!(
            "{:<14}{:<18}{:<7}{}",
            post.channel.as_str(),
            post.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
            if post.image_id.is_some() { "yes" } else { "no" },
            title
        );
    }
}
