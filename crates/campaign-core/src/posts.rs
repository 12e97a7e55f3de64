use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::campaign::ChannelId;

const MAX_TITLE_CHARS: usize = 80;

/// One planned post for a channel, in logical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub index: usize,
    pub title: String,
    pub text: String,
}

/// A post ready for persistence. `image_id` is `None` when image generation
/// failed for this post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalPost {
    pub id: Uuid,
    pub case_study_id: Uuid,
    pub title: String,
    pub content: String,
    pub channel: ChannelId,
    pub scheduled_at: DateTime<Utc>,
    pub image_id: Option<Uuid>,
}

/// Derive a display title from post text: the first non-blank line,
/// truncated to 80 characters on a char boundary.
#[must_use]
pub fn derive_title(text: &str) -> String {
    let first_line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    if first_line.chars().count() <= MAX_TITLE_CHARS {
        return first_line.to_string();
    }
    let truncated: String = first_line.chars().take(MAX_TITLE_CHARS - 1).collect();
    format!("{}…", truncated.trim_end())
}
