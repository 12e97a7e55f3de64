//! Weekly posting cadence derived from the campaign type.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::campaign::CampaignType;

/// Weekday numbers counted from Sunday = 0.
const FIVE_PER_WEEK_DAYS: &[u32] = &[0, 1, 2, 3, 4];
const THREE_PER_WEEK_DAYS: &[u32] = &[0, 2, 4];

/// Posting frequency and the weekdays a post may land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceRule {
    pub posts_per_week: u32,
    /// Allowed weekdays, Sunday = 0 through Saturday = 6. Never empty.
    pub allowed_weekdays: &'static [u32],
}

impl CadenceRule {
    #[must_use]
    pub fn allows(&self, weekday: Weekday) -> bool {
        self.allowed_weekdays
            .contains(&weekday.num_days_from_sunday())
    }

    #[must_use]
    pub fn allows_date(&self, date: NaiveDate) -> bool {
        self.allows(date.weekday())
    }

    /// Posts per channel over `weeks` weeks.
    #[must_use]
    pub fn total_posts(&self, weeks: u32) -> usize {
        usize::try_from(self.posts_per_week.saturating_mul(weeks)).unwrap_or(usize::MAX)
    }
}

/// Resolve the cadence for a campaign type.
///
/// Awareness and engagement campaigns post five times a week, Sunday through
/// Thursday. Everything else posts three times a week on Sunday, Tuesday and
/// Thursday.
#[must_use]
pub fn cadence_for(campaign_type: CampaignType) -> CadenceRule {
    match campaign_type {
        CampaignType::BrandingAwareness | CampaignType::Engagement => CadenceRule {
            posts_per_week: 5,
            allowed_weekdays: FIVE_PER_WEEK_DAYS,
        },
        CampaignType::SalesConversion => CadenceRule {
            posts_per_week: 3,
            allowed_weekdays: THREE_PER_WEEK_DAYS,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awareness_and_engagement_post_five_times() {
        for campaign_type in [CampaignType::BrandingAwareness, CampaignType::Engagement] {
            let rule = cadence_for(campaign_type);
            assert_eq!(rule.posts_per_week, 5);
            assert_eq!(rule.allowed_weekdays, &[0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn sales_conversion_posts_three_times() {
        let rule = cadence_for(CampaignType::SalesConversion);
        assert_eq!(rule.posts_per_week, 3);
        assert_eq!(rule.allowed_weekdays, &[0, 2, 4]);
    }

    #[test]
    fn allows_uses_sunday_based_numbering() {
        let rule = cadence_for(CampaignType::SalesConversion);
        assert!(rule.allows(Weekday::Sun));
        assert!(rule.allows(Weekday::Tue));
        assert!(rule.allows(Weekday::Thu));
        assert!(!rule.allows(Weekday::Mon));
        assert!(!rule.allows(Weekday::Sat));
    }

    #[test]
    fn five_per_week_excludes_friday_and_saturday() {
        let rule = cadence_for(CampaignType::Engagement);
        assert!(!rule.allows(Weekday::Fri));
        assert!(!rule.allows(Weekday::Sat));
        assert!(rule.allows(Weekday::Wed));
    }

    #[test]
    fn total_posts_multiplies_by_weeks() {
        assert_eq!(cadence_for(CampaignType::SalesConversion).total_posts(4), 12);
        assert_eq!(cadence_for(CampaignType::BrandingAwareness).total_posts(3), 15);
    }

    #[test]
    fn allowed_days_cover_posts_per_week() {
        for campaign_type in [
            CampaignType::BrandingAwareness,
            CampaignType::Engagement,
            CampaignType::SalesConversion,
        ] {
            let rule = cadence_for(campaign_type);
            assert!(!rule.allowed_weekdays.is_empty());
            assert!(rule.allowed_weekdays.len() >= usize::try_from(rule.posts_per_week).unwrap());
        }
    }
}
