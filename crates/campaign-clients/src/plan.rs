//! Multi-channel text plan: one chat call returns every post for every channel.

use std::collections::BTreeMap;

use campaign_core::{derive_title, CampaignType, ChannelId, ContentLength, PostDraft};
use serde_json::{json, Value};

use crate::client::GenerationClient;
use crate::error::GenerationError;
use crate::language::Language;

/// Planned posts keyed by channel. A requested channel that is absent has no
/// usable plan.
pub type ChannelPlans = BTreeMap<ChannelId, Vec<PostDraft>>;

/// Everything the text service needs to write a campaign's posts.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub case_study_title: String,
    pub case_study_body: String,
    pub channels: Vec<ChannelId>,
    pub posts_per_channel: usize,
    pub campaign_type: CampaignType,
    pub content_length: ContentLength,
    pub language: Language,
}

impl PlanRequest {
    fn user_prompt(&self) -> String {
        let channels = self
            .channels
            .iter()
            .map(ChannelId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Write {posts} social media posts for each of these channels: {channels}.\n\
             Campaign goal: {goal}.\n\
             Each post should be about {words} words and written in {language}.\n\
             Every post must be distinct and grounded in the case study below.\n\n\
             Case study title: {title}\n\
             Case study:\n{body}\n\n\
             Respond with a JSON object of the form \
             {{\"channels\": {{\"<CHANNEL>\": [{{\"title\": \"...\", \"content\": \"...\"}}]}}}} \
             using exactly the channel names given.",
            posts = self.posts_per_channel,
            goal = campaign_goal(self.campaign_type),
            words = self.content_length.target_words(),
            language = self.language,
            title = self.case_study_title,
            body = self.case_study_body,
        )
    }
}

fn campaign_goal(campaign_type: CampaignType) -> &'static str {
    match campaign_type {
        CampaignType::BrandingAwareness => "build brand awareness and recognition",
        CampaignType::Engagement => "drive comments, shares and conversation",
        CampaignType::SalesConversion => "convert readers into paying customers",
    }
}

impl GenerationClient {
    /// Generates the whole campaign's text in a single call.
    ///
    /// A body that does not contain a usable plan is not an error: it yields
    /// an empty [`ChannelPlans`] (see [`parse_plan`]).
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the chat call itself fails.
    pub async fn generate_plan(
        &self,
        request: &PlanRequest,
    ) -> Result<ChannelPlans, GenerationError> {
        let messages = json!([
            {
                "role": "system",
                "content": "You are a social media copywriter. Respond only with JSON."
            },
            { "role": "user", "content": request.user_prompt() }
        ]);
        let content = self.chat("text plan", messages, true).await?;
        Ok(parse_plan(
            &content,
            &request.channels,
            request.posts_per_channel,
        ))
    }
}

/// Extract per-channel drafts from the service's JSON reply.
///
/// Accepts either `{"channels": {...}}` or the channel map at the top level.
/// Channel keys match case-insensitively. Each entry may be a plain string or
/// an object with `content` (or `text`) and an optional `title`. Blank entries
/// are dropped, at most `limit` drafts are kept per channel, and channels that
/// were not requested are ignored.
#[must_use]
pub fn parse_plan(content: &str, channels: &[ChannelId], limit: usize) -> ChannelPlans {
    let mut plans = ChannelPlans::new();

    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "text plan is not valid JSON; treating as empty");
            return plans;
        }
    };

    let Some(root) = value
        .get("channels")
        .unwrap_or(&value)
        .as_object()
    else {
        tracing::warn!("text plan has no channel map; treating as empty");
        return plans;
    };

    for channel in channels {
        let entries = root
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(channel.as_str()))
            .and_then(|(_, v)| v.as_array());

        let Some(entries) = entries else {
            tracing::warn!(channel = %channel, "text plan has no posts for channel");
            continue;
        };

        let drafts: Vec<PostDraft> = entries
            .iter()
            .filter_map(entry_text)
            .take(limit)
            .enumerate()
            .map(|(index, (title, text))| PostDraft { index, title, text })
            .collect();

        if drafts.len() < limit {
            tracing::warn!(
                channel = %channel,
                expected = limit,
                got = drafts.len(),
                "text plan returned fewer posts than requested"
            );
        }

        if !drafts.is_empty() {
            plans.insert(channel.clone(), drafts);
        }
    }

    plans
}

fn entry_text(entry: &Value) -> Option<(String, String)> {
    let (title, text) = match entry {
        Value::String(s) => (None, s.trim()),
        Value::Object(map) => {
            let text = map
                .get("content")
                .or_else(|| map.get("text"))
                .and_then(Value::as_str)?
                .trim();
            let title = map
                .get("title")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty());
            (title, text)
        }
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    let title = title.map_or_else(|| derive_title(text), str::to_owned);
    Some((title, text.to_owned()))
}
