use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cadence::{cadence_for, CadenceRule};
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    BrandingAwareness,
    Engagement,
    SalesConversion,
}

impl CampaignType {
    #[must_use]
    pub fn cadence(self) -> CadenceRule {
        cadence_for(self)
    }
}

impl std::fmt::Display for CampaignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignType::BrandingAwareness => write!(f, "branding_awareness"),
            CampaignType::Engagement => write!(f, "engagement"),
            CampaignType::SalesConversion => write!(f, "sales_conversion"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentLength {
    Short,
    Medium,
    Long,
}

impl ContentLength {
    /// Approximate word count requested per post.
    #[must_use]
    pub fn target_words(self) -> u32 {
        match self {
            ContentLength::Short => 40,
            ContentLength::Medium => 90,
            ContentLength::Long => 180,
        }
    }
}

impl std::fmt::Display for ContentLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentLength::Short => write!(f, "short"),
            ContentLength::Medium => write!(f, "medium"),
            ContentLength::Long => write!(f, "long"),
        }
    }
}

/// A distribution channel identifier such as `FACEBOOK` or `LINKEDIN`.
///
/// Always trimmed and upper-cased so that `facebook` and `FACEBOOK` name the
/// same channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Normalise and validate a channel identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the identifier is blank.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Validation(
                "channel id must be non-empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChannelId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChannelId> for String {
    fn from(value: ChannelId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source marketing content that seeds every generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudy {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub reference_images: Vec<String>,
}

/// Immutable campaign parameters for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSpec {
    pub case_study_id: Uuid,
    pub weeks: u32,
    pub campaign_type: CampaignType,
    pub content_length: ContentLength,
    pub channels: BTreeSet<ChannelId>,
}

impl CampaignSpec {
    /// Build a validated spec. Duplicate channels collapse into one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `weeks` is zero or no channel
    /// is given.
    pub fn new(
        case_study_id: Uuid,
        weeks: u32,
        campaign_type: CampaignType,
        content_length: ContentLength,
        channels: impl IntoIterator<Item = ChannelId>,
    ) -> Result<Self, ConfigError> {
        if weeks == 0 {
            return Err(ConfigError::Validation(
                "campaign must run for at least one week".to_string(),
            ));
        }
        let channels: BTreeSet<ChannelId> = channels.into_iter().collect();
        if channels.is_empty() {
            return Err(ConfigError::Validation(
                "campaign must target at least one channel".to_string(),
            ));
        }
        Ok(Self {
            case_study_id,
            weeks,
            campaign_type,
            content_length,
            channels,
        })
    }

    #[must_use]
    pub fn cadence(&self) -> CadenceRule {
        self.campaign_type.cadence()
    }

    /// Number of posts each channel receives over the whole campaign.
    #[must_use]
    pub fn posts_per_channel(&self) -> usize {
        self.cadence().total_posts(self.weeks)
    }
}

/// A case study together with the campaign to generate from it.
#[derive(Debug, Clone)]
pub struct CampaignRequest {
    pub case_study: CaseStudy,
    pub spec: CampaignSpec,
}

#[derive(Debug, Deserialize)]
struct CampaignFile {
    case_study: CaseStudy,
    campaign: CampaignSection,
}

#[derive(Debug, Deserialize)]
struct CampaignSection {
    weeks: u32,
    campaign_type: CampaignType,
    content_length: ContentLength,
    channels: Vec<ChannelId>,
}

/// Load and validate a campaign definition from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_campaign(path: &Path) -> Result<CampaignRequest, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CampaignFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_campaign(&content)
}

/// Parse and validate a campaign definition from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError::CampaignFileParse`] on malformed YAML and
/// [`ConfigError::Validation`] when the content is structurally valid but
/// unusable.
pub fn parse_campaign(content: &str) -> Result<CampaignRequest, ConfigError> {
    let file: CampaignFile = serde_yaml::from_str(content)?;

    if file.case_study.body.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "case study '{}' has an empty body",
            file.case_study.title
        )));
    }

    let spec = CampaignSpec::new(
        file.case_study.id,
        file.campaign.weeks,
        file.campaign.campaign_type,
        file.campaign.content_length,
        file.campaign.channels,
    )?;

    Ok(CampaignRequest {
        case_study: file.case_study,
        spec,
    })
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
