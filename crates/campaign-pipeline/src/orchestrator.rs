//! End-to-end campaign run.
//!
//! A run moves through `Planning -> PerChannelProcessing -> Aggregating` and
//! ends in `Done` or `Failed`:
//!
//! - **Planning** makes the single text-plan call and, when the case study
//!   has reference images, the single reference analysis call.
//! - **PerChannelProcessing** assigns every planned post its slot up front,
//!   then walks each channel in index order preparing image prompts. Each
//!   prepared prompt starts an image task in the channel's [`JoinSet`];
//!   channels run concurrently and all image tasks share one
//!   [`RateLimiter`]. The sets belong to the run, so dropping the run
//!   aborts every image task still in flight.
//! - **Aggregating** waits for every image task to settle and builds the
//!   batch. The batch is written with one bulk insert, and only if the run
//!   was not cancelled.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use campaign_clients::{detect_language, ChannelPlans, PlanRequest};
use campaign_core::{AppConfig, CampaignRequest, ChannelId, FinalPost};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::aggregate::{BatchAggregator, PostWorkItem};
use crate::call::{guarded, timed};
use crate::error::{PipelineError, StageError};
use crate::image::ImageProducer;
use crate::prompt::ImagePromptPipeline;
use crate::rate_limit::RateLimiter;
use crate::schedule::DateScheduler;
use crate::services::Collaborators;

/// Limits applied to one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Upper bound on any single external call.
    pub call_timeout: Duration,
    pub max_prompt_chars: usize,
    /// Image-generation requests allowed per `rate_window`.
    pub rate_limit: u32,
    pub rate_window: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(180),
            max_prompt_chars: 1000,
            rate_limit: 6,
            rate_window: Duration::from_secs(60),
        }
    }
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            max_prompt_chars: config.max_prompt_chars,
            rate_limit: config.image_rate_limit,
            rate_window: Duration::from_secs(config.image_rate_window_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Planning,
    PerChannelProcessing,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Planning => "planning",
            Self::PerChannelProcessing => "per_channel_processing",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a successful run created.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Persisted posts, ordered by channel then publication time.
    pub posts: Vec<FinalPost>,
    /// Posts the text plan produced across all channels.
    pub planned: usize,
    pub with_images: usize,
    /// Posts persisted without an image.
    pub image_failures: usize,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Created(RunReport),
    /// The plan yielded no post for any channel. Nothing was written.
    NoPostsToCreate,
}

/// A channel's work items and the image tasks started for them. Each task
/// yields its item's position in `items`.
struct ChannelWork {
    items: Vec<PostWorkItem>,
    images: JoinSet<(usize, Result<Uuid, StageError>)>,
}

pub struct CampaignPipeline {
    collaborators: Collaborators,
    settings: PipelineSettings,
}

impl CampaignPipeline {
    #[must_use]
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    /// Run the campaign with schedules starting after today (UTC).
    ///
    /// # Errors
    ///
    /// See [`CampaignPipeline::run_from`].
    pub async fn run(
        &self,
        request: &CampaignRequest,
        token: &CancellationToken,
    ) -> Result<RunOutcome, PipelineError> {
        self.run_from(request, Utc::now().date_naive(), token).await
    }

    /// Run the campaign with every channel's first slot after `start`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Planning`] if the text-plan call fails.
    /// - [`PipelineError::Persistence`] if the bulk insert fails.
    /// - [`PipelineError::Cancelled`] if `token` is cancelled before the
    ///   bulk insert starts. No posts are written in that case.
    pub async fn run_from(
        &self,
        request: &CampaignRequest,
        start: NaiveDate,
        token: &CancellationToken,
    ) -> Result<RunOutcome, PipelineError> {
        let result = self.execute(request, start, token).await;
        if let Err(e) = &result {
            tracing::error!(
                case_study_id = %request.case_study.id,
                state = %RunState::Failed,
                error = %e,
                "campaign run failed"
            );
        }
        result
    }

    async fn execute(
        &self,
        request: &CampaignRequest,
        start: NaiveDate,
        token: &CancellationToken,
    ) -> Result<RunOutcome, PipelineError> {
        let case_study = &request.case_study;
        let spec = &request.spec;
        let case_study_id = case_study.id;

        transition(case_study_id, RunState::Planning);
        let per_channel = spec.posts_per_channel();
        let plans = self.plan(request, token).await?;

        let planned: usize = plans.values().map(Vec::len).sum();
        for channel in &spec.channels {
            if plans.get(channel).is_none_or(Vec::is_empty) {
                tracing::warn!(%channel, "text plan has no posts for channel");
            }
        }
        if planned == 0 {
            tracing::info!(%case_study_id, "no posts to create");
            transition(case_study_id, RunState::Done);
            return Ok(RunOutcome::NoPostsToCreate);
        }
        tracing::info!(
            %case_study_id,
            channels = plans.len(),
            planned,
            per_channel,
            "text plan ready"
        );

        let reference_summary = self.analyze_references(request, token).await?;

        transition(case_study_id, RunState::PerChannelProcessing);
        let channels = schedule_plans(plans, spec.cadence(), start);

        let limiter = Arc::new(RateLimiter::new(
            self.settings.rate_limit,
            self.settings.rate_window,
        ));
        let prompts = ImagePromptPipeline::new(
            Arc::clone(&self.collaborators.prompts),
            reference_summary,
            self.settings.max_prompt_chars,
            self.settings.call_timeout,
        );
        let producer = ImageProducer::new(
            Arc::clone(&self.collaborators.images),
            Arc::clone(&self.collaborators.blobs),
            Arc::clone(&self.collaborators.store),
            limiter,
            self.settings.call_timeout,
            &format!("case-studies/{case_study_id}"),
        );

        let dispatched = join_all(
            channels
                .into_iter()
                .map(|items| dispatch_channel(items, &prompts, &producer, token)),
        )
        .await;

        transition(case_study_id, RunState::Aggregating);
        let mut aggregator = BatchAggregator::new(case_study_id);
        for work in dispatched {
            for item in settle_channel(work).await {
                aggregator.push(item);
            }
        }
        let batch = aggregator.finish();

        if token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        if batch.is_empty() {
            tracing::info!(%case_study_id, "no posts to create");
            transition(case_study_id, RunState::Done);
            return Ok(RunOutcome::NoPostsToCreate);
        }

        timed(
            "bulk_create_posts",
            self.settings.call_timeout,
            self.collaborators.store.bulk_create_posts(&batch.posts),
        )
        .await
        .map_err(PipelineError::Persistence)?;

        transition(case_study_id, RunState::Done);
        tracing::info!(
            %case_study_id,
            posts = batch.posts.len(),
            with_images = batch.with_images,
            image_failures = batch.image_failures,
            "campaign posts created"
        );

        Ok(RunOutcome::Created(RunReport {
            posts: batch.posts,
            planned,
            with_images: batch.with_images,
            image_failures: batch.image_failures,
        }))
    }

    /// The one text-plan call. Drafts for channels that were not requested
    /// are dropped and each channel is capped at the cadence's post count.
    async fn plan(
        &self,
        request: &CampaignRequest,
        token: &CancellationToken,
    ) -> Result<ChannelPlans, PipelineError> {
        let case_study = &request.case_study;
        let spec = &request.spec;
        let per_channel = spec.posts_per_channel();

        let plan_request = PlanRequest {
            case_study_title: case_study.title.clone(),
            case_study_body: case_study.body.clone(),
            channels: spec.channels.iter().cloned().collect(),
            posts_per_channel: per_channel,
            campaign_type: spec.campaign_type,
            content_length: spec.content_length,
            language: detect_language(&format!("{}\n{}", case_study.title, case_study.body)),
        };
        tracing::debug!(language = %plan_request.language, "requesting text plan");

        let plans = guarded(
            "generate_plan",
            self.settings.call_timeout,
            token,
            self.collaborators.text.generate_plan(&plan_request),
        )
        .await
        .map_err(|e| match e {
            StageError::Cancelled => PipelineError::Cancelled,
            e => PipelineError::Planning(e),
        })?;

        Ok(plans
            .into_iter()
            .filter(|(channel, _)| spec.channels.contains(channel))
            .map(|(channel, drafts)| {
                let drafts = drafts
                    .into_iter()
                    .filter(|d| !d.text.trim().is_empty())
                    .take(per_channel)
                    .collect::<Vec<_>>();
                (channel, drafts)
            })
            .filter(|(_, drafts)| !drafts.is_empty())
            .collect())
    }

    /// Shared visual summary of the reference images, computed once per run.
    /// Any failure other than cancellation just means no summary.
    async fn analyze_references(
        &self,
        request: &CampaignRequest,
        token: &CancellationToken,
    ) -> Result<Option<String>, PipelineError> {
        let images = &request.case_study.reference_images;
        if images.is_empty() {
            return Ok(None);
        }

        match guarded(
            "analyze_references",
            self.settings.call_timeout,
            token,
            self.collaborators.analyzer.analyze(images),
        )
        .await
        {
            Ok(summary) if !summary.trim().is_empty() => Ok(Some(summary)),
            Ok(_) => Ok(None),
            Err(StageError::Cancelled) => Err(PipelineError::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "reference image analysis failed; continuing without it");
                Ok(None)
            }
        }
    }
}

fn transition(case_study_id: Uuid, state: RunState) {
    tracing::info!(%case_study_id, %state, "campaign run state");
}

/// Turn each channel's drafts into work items carrying their slot.
///
/// Runs before any image work is dispatched so each slot depends only on the
/// post's position in its channel.
fn schedule_plans(
    plans: ChannelPlans,
    rule: campaign_core::CadenceRule,
    start: NaiveDate,
) -> Vec<Vec<PostWorkItem>> {
    let mut scheduler = DateScheduler::new(rule, start);
    plans
        .into_iter()
        .map(|(channel, drafts)| {
            drafts
                .into_iter()
                .enumerate()
                .map(|(index, draft)| {
                    let slot = scheduler.next(&channel);
                    let mut item = PostWorkItem::new(channel.clone(), index, draft.title, draft.text);
                    item.scheduled_at = Some(slot.at());
                    item
                })
                .collect()
        })
        .collect()
}

/// Prepare prompts for one channel in index order, starting an image task
/// for every prompt that succeeds.
async fn dispatch_channel(
    items: Vec<PostWorkItem>,
    prompts: &ImagePromptPipeline,
    producer: &ImageProducer,
    token: &CancellationToken,
) -> ChannelWork {
    let mut work = ChannelWork {
        items: Vec::with_capacity(items.len()),
        images: JoinSet::new(),
    };
    for mut item in items {
        if token.is_cancelled() {
            work.items.push(item);
            continue;
        }

        match prompts.prepare(&item.text, token).await {
            Ok(prompt) => {
                item.image_prompt = Some(prompt.clone());
                let position = work.items.len();
                let producer = producer.clone();
                let token = token.clone();
                work.images
                    .spawn(async move { (position, producer.produce(&prompt, &token).await) });
            }
            Err(StageError::Cancelled) => {}
            Err(e) => {
                log_image_failure(&item.channel, item.index, &e);
                item.failed = true;
            }
        }
        work.items.push(item);
    }
    work
}

/// Wait for every image task in the channel and attach the image ids.
async fn settle_channel(mut work: ChannelWork) -> Vec<PostWorkItem> {
    while let Some(joined) = work.images.join_next().await {
        let (position, result) = match joined {
            Ok(settled) => settled,
            Err(e) => {
                tracing::warn!(error = %e, "image task did not complete");
                continue;
            }
        };
        let Some(item) = work.items.get_mut(position) else {
            continue;
        };
        match result {
            Ok(image_id) => item.generated_image_id = Some(image_id),
            Err(StageError::Cancelled) => {}
            Err(e) => log_image_failure(&item.channel, item.index, &e),
        }
    }
    work.items
}

fn log_image_failure(channel: &ChannelId, index: usize, error: &StageError) {
    tracing::warn!(
        %channel,
        index,
        error = %error,
        "image pipeline failed; post keeps text only"
    );
}
