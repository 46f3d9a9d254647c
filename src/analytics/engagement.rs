//! Attempts per calendar day

use crate::TestAttempt;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of most recent active days shown by default
pub const DEFAULT_ENGAGEMENT_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub day: NaiveDate,
    pub attempts: usize,
}

/// Calendar day of `timestamp` in the user's local offset
pub fn local_day(timestamp: &DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    timestamp.with_timezone(offset).date_naive()
}

/// Completed attempts grouped by local day, ascending, keeping only the last
/// `days` days that have any attempts. Days without attempts are absent.
pub fn engagement_timeline(
    attempts: &[TestAttempt],
    offset: &FixedOffset,
    days: usize,
) -> Vec<DayBucket> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for attempt in attempts.iter().filter(|a| a.is_completed) {
        *by_day.entry(local_day(&attempt.start_time, offset)).or_insert(0) += 1;
    }

    let skip = by_day.len().saturating_sub(days);
    by_day
        .into_iter()
        .skip(skip)
        .map(|(day, attempts)| DayBucket { day, attempts })
        .collect()
}
