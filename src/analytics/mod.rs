//! Cross-attempt statistics for the performance dashboard
//!
//! Every function here is a pure read over a snapshot of attempts and stats.
//! Only completed attempts are considered. Calendar-day grouping uses the
//! aggregator's fixed UTC offset, and "today" is always passed in.

pub mod accuracy;
pub mod distribution;
pub mod engagement;
pub mod milestones;
pub mod streak;
pub mod trend;

pub use accuracy::{overall_accuracy, subject_ranking, AccuracySplit, SubjectAccuracy};
pub use distribution::{score_distribution, ScoreDistribution, BUCKET_LABELS};
pub use engagement::{engagement_timeline, local_day, DayBucket, DEFAULT_ENGAGEMENT_DAYS};
pub use milestones::{
    milestone_progress, MilestoneProgress, MilestoneStatus, NextMilestone, DEFAULT_MILESTONES,
};
pub use streak::{
    streak_message, streak_summary, weekday_index, weekly_practice, StreakSummary, WeeklyPractice,
};
pub use trend::{accuracy_trend, AccuracyTrend, TrendPoint};

use crate::config::Config;
use crate::{TestAttempt, UserStats};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;
use tracing::debug;

/// Everything the analytics screen shows, computed in one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: NaiveDate,
    pub completed_attempts: usize,
    pub accuracy: AccuracySplit,
    pub trend: AccuracyTrend,
    pub engagement: Vec<DayBucket>,
    pub distribution: ScoreDistribution,
    pub milestones: MilestoneProgress,
    pub streak: StreakSummary,
    pub subjects: Vec<SubjectAccuracy>,
}

#[derive(Debug, Clone)]
pub struct AnalyticsAggregator {
    offset: FixedOffset,
    milestones: Vec<u32>,
    engagement_days: usize,
}

impl AnalyticsAggregator {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            milestones: DEFAULT_MILESTONES.to_vec(),
            engagement_days: DEFAULT_ENGAGEMENT_DAYS,
        }
    }

    /// Offset, milestones and engagement window from config; an offset outside
    /// +/-24h falls back to UTC
    pub fn from_config(config: &Config) -> Self {
        let offset = config
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes.saturating_mul(60)))
            .unwrap_or_else(utc);
        let mut aggregator = Self::new(offset);
        if let Some(milestones) = &config.milestones {
            aggregator.milestones = milestones.clone();
        }
        if let Some(days) = config.engagement_days {
            aggregator.engagement_days = days;
        }
        aggregator
    }

    pub fn with_milestones(mut self, milestones: Vec<u32>) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn with_engagement_days(mut self, days: usize) -> Self {
        self.engagement_days = days;
        self
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    pub fn overall_accuracy(&self, stats: &UserStats) -> AccuracySplit {
        overall_accuracy(stats)
    }

    pub fn accuracy_trend(&self, attempts: &[TestAttempt]) -> AccuracyTrend {
        accuracy_trend(attempts)
    }

    pub fn engagement_timeline(&self, attempts: &[TestAttempt]) -> Vec<DayBucket> {
        engagement_timeline(attempts, &self.offset, self.engagement_days)
    }

    pub fn score_distribution(&self, attempts: &[TestAttempt]) -> ScoreDistribution {
        score_distribution(attempts)
    }

    pub fn milestone_progress(&self, attempt_count: u32) -> MilestoneProgress {
        milestone_progress(attempt_count, &self.milestones)
    }

    pub fn weekly_practice(&self, attempts: &[TestAttempt], today: NaiveDate) -> WeeklyPractice {
        weekly_practice(attempts, today, &self.offset)
    }

    pub fn streak_summary(
        &self,
        stats: &UserStats,
        attempts: &[TestAttempt],
        today: NaiveDate,
    ) -> StreakSummary {
        streak_summary(stats, attempts, today, &self.offset)
    }

    pub fn subject_ranking(&self, stats: &UserStats) -> Vec<SubjectAccuracy> {
        subject_ranking(stats)
    }

    pub fn dashboard(
        &self,
        stats: &UserStats,
        attempts: &[TestAttempt],
        today: NaiveDate,
    ) -> Dashboard {
        let completed = attempts.iter().filter(|a| a.is_completed).count();
        debug!(
            "Building dashboard for {} completed of {} attempts",
            completed,
            attempts.len()
        );

        Dashboard {
            today,
            completed_attempts: completed,
            accuracy: self.overall_accuracy(stats),
            trend: self.accuracy_trend(attempts),
            engagement: self.engagement_timeline(attempts),
            distribution: self.score_distribution(attempts),
            milestones: self.milestone_progress(u32::try_from(completed).unwrap_or(u32::MAX)),
            streak: self.streak_summary(stats, attempts, today),
            subjects: self.subject_ranking(stats),
        }
    }
}

impl Default for AnalyticsAggregator {
    fn default() -> Self {
        Self::new(utc())
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
