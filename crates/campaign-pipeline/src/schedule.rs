//! Publication slot assignment.
//!
//! Each channel owns one cursor date. Every call to [`DateScheduler::next`]
//! moves that channel's cursor forward at least one day to the next weekday
//! the cadence allows, so dates on a channel are strictly increasing. Slots
//! are assigned by logical post index before any image work is dispatched,
//! never from task completions.

use std::collections::HashMap;
use std::ops::Range;

use campaign_core::{CadenceRule, ChannelId};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Publish hours (UTC) drawn uniformly per post: 11:00 through 19:00.
pub const PUBLISH_HOURS: Range<u32> = 11..20;

/// A post's publication date and whole hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduledSlot {
    pub date: NaiveDate,
    pub hour: u32,
}

impl ScheduledSlot {
    /// The slot as a UTC timestamp with zero minutes and seconds.
    #[must_use]
    pub fn at(&self) -> DateTime<Utc> {
        (self.date.and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(self.hour))).and_utc()
    }
}

pub struct DateScheduler<R = StdRng> {
    rule: CadenceRule,
    origin: NaiveDate,
    cursors: HashMap<ChannelId, NaiveDate>,
    rng: R,
}

impl DateScheduler<StdRng> {
    /// A scheduler whose cursors all start at `origin`. The first slot of a
    /// channel is therefore strictly after `origin`.
    #[must_use]
    pub fn new(rule: CadenceRule, origin: NaiveDate) -> Self {
        Self::with_rng(rule, origin, StdRng::from_os_rng())
    }
}

impl<R: Rng> DateScheduler<R> {
    pub fn with_rng(rule: CadenceRule, origin: NaiveDate, rng: R) -> Self {
        Self {
            rule,
            origin,
            cursors: HashMap::new(),
            rng,
        }
    }

    /// Advance `channel`'s cursor to its next allowed date and draw an hour.
    ///
    /// # Panics
    ///
    /// Panics if the cursor runs past the last date chrono can represent.
    pub fn next(&mut self, channel: &ChannelId) -> ScheduledSlot {
        let cursor = self
            .cursors
            .entry(channel.clone())
            .or_insert(self.origin);

        // At most seven steps: every cadence allows at least one weekday.
        let mut date = *cursor;
        loop {
            date = date.succ_opt().expect("schedule date within chrono range");
            if self.rule.allows_date(date) {
                break;
            }
        }
        *cursor = date;

        ScheduledSlot {
            date,
            hour: self.rng.random_range(PUBLISH_HOURS),
        }
    }

    /// Assign `count` consecutive slots to `channel`, in order.
    pub fn take(&mut self, channel: &ChannelId, count: usize) -> Vec<ScheduledSlot> {
        (0..count).map(|_| self.next(channel)).collect()
    }
}
