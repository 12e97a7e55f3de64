//! Settled work items to the persistable batch.

use campaign_core::{ChannelId, FinalPost};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One post's progress through a run.
///
/// `failed` records that the image sub-pipeline was abandoned for this post
/// (prompt compression failed). The text still counts.
#[derive(Debug, Clone)]
pub struct PostWorkItem {
    pub channel: ChannelId,
    pub index: usize,
    pub title: String,
    pub text: String,
    pub image_prompt: Option<String>,
    pub generated_image_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub failed: bool,
}

impl PostWorkItem {
    #[must_use]
    pub fn new(channel: ChannelId, index: usize, title: String, text: String) -> Self {
        Self {
            channel,
            index,
            title,
            text,
            image_prompt: None,
            generated_image_id: None,
            scheduled_at: None,
            failed: false,
        }
    }
}

/// The batch handed to persistence plus what happened to images along the way.
#[derive(Debug, Clone, Default)]
pub struct AggregatedBatch {
    pub posts: Vec<FinalPost>,
    pub with_images: usize,
    pub image_failures: usize,
}

impl AggregatedBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

pub struct BatchAggregator {
    case_study_id: Uuid,
    batch: AggregatedBatch,
    dropped: usize,
}

impl BatchAggregator {
    #[must_use]
    pub fn new(case_study_id: Uuid) -> Self {
        Self {
            case_study_id,
            batch: AggregatedBatch::default(),
            dropped: 0,
        }
    }

    /// Accept a settled item. Items without text or without a slot are
    /// dropped; a missing image never is.
    pub fn push(&mut self, item: PostWorkItem) {
        let Some(scheduled_at) = item.scheduled_at else {
            self.dropped += 1;
            return;
        };
        if item.text.trim().is_empty() {
            self.dropped += 1;
            return;
        }

        if item.generated_image_id.is_some() {
            self.batch.with_images += 1;
        } else {
            self.batch.image_failures += 1;
        }

        self.batch.posts.push(FinalPost {
            id: Uuid::new_v4(),
            case_study_id: self.case_study_id,
            title: item.title,
            content: item.text,
            channel: item.channel,
            scheduled_at,
            image_id: item.generated_image_id,
        });
    }

    /// Posts come out ordered by channel, then by publication time.
    #[must_use]
    pub fn finish(mut self) -> AggregatedBatch {
        if self.dropped > 0 {
            tracing::debug!(dropped = self.dropped, "work items without text dropped");
        }
        self.batch
            .posts
            .sort_by(|a, b| (&a.channel, a.scheduled_at).cmp(&(&b.channel, b.scheduled_at)));
        self.batch
    }
}
