//! Streak reporting and the Monday-to-Sunday weekly practice view

use super::engagement::local_day;
use crate::{TestAttempt, UserStats};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeSet;

/// Monday = 0 .. Sunday = 6, independent of any locale's first weekday
pub fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

/// Monday of the week containing `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPractice {
    /// Indexed Monday = 0 .. Sunday = 6
    pub days: [bool; 7],
    pub today_index: usize,
    pub practiced_today: bool,
}

/// Which days of the current week (the one containing `today`) had a completed attempt
pub fn weekly_practice(
    attempts: &[TestAttempt],
    today: NaiveDate,
    offset: &FixedOffset,
) -> WeeklyPractice {
    let monday = week_start(today);
    let sunday = monday + Duration::days(6);

    let mut days = [false; 7];
    for attempt in attempts.iter().filter(|a| a.is_completed) {
        let day = local_day(&attempt.start_time, offset);
        if day >= monday && day <= sunday {
            days[weekday_index(day.weekday())] = true;
        }
    }

    let today_index = weekday_index(today.weekday());
    WeeklyPractice {
        days,
        today_index,
        practiced_today: days[today_index],
    }
}

/// Distinct local days with at least one completed attempt
pub fn total_practice_days(attempts: &[TestAttempt], offset: &FixedOffset) -> usize {
    attempts
        .iter()
        .filter(|a| a.is_completed)
        .map(|a| local_day(&a.start_time, offset))
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn streak_message(current_streak: u32, practiced_today: bool) -> &'static str {
    match (practiced_today, current_streak) {
        (true, s) if s >= 7 => "Amazing! You're on fire! Keep the momentum going!",
        (true, s) if s >= 3 => "Great job today! Your consistency is paying off!",
        (true, _) => "Well done! You've practiced today. Keep building your streak!",
        (false, s) if s > 0 => "Keep it up! Practice tomorrow to maintain your streak.",
        _ => "Start your streak today! Every journey begins with a single step.",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_practice_days: usize,
    pub weekly: WeeklyPractice,
    pub message: &'static str,
}

/// Streak counters are read from `stats` as-is; only the calendar views are derived
pub fn streak_summary(
    stats: &UserStats,
    attempts: &[TestAttempt],
    today: NaiveDate,
    offset: &FixedOffset,
) -> StreakSummary {
    let weekly = weekly_practice(attempts, today, offset);
    StreakSummary {
        current_streak: stats.current_streak,
        longest_streak: stats.longest_streak,
        total_practice_days: total_practice_days(attempts, offset),
        message: streak_message(stats.current_streak, weekly.practiced_today),
        weekly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn completed_on(id: &str, y: i32, m: u32, d: u32) -> TestAttempt {
        let mut attempt = TestAttempt::new(id, "t1", Utc.with_ymd_and_hms(y, m, d, 11, 0, 0).unwrap());
        attempt.is_completed = true;
        attempt
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_index_starts_monday() {
        assert_eq!(weekday_index(Weekday::Mon), 0);
        assert_eq!(weekday_index(Weekday::Sat), 5);
        assert_eq!(weekday_index(Weekday::Sun), 6);
    }

    #[test]
    fn week_start_for_sunday_is_previous_monday() {
        // 2024-01-07 is a Sunday
        assert_eq!(week_start(date(2024, 1, 7)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 1)), date(2024, 1, 1));
    }

    #[test]
    fn weekly_practice_marks_days_in_current_week() {
        let attempts = vec![
            completed_on("mon", 2024, 1, 1),
            completed_on("wed", 2024, 1, 3),
            completed_on("sun", 2024, 1, 7),
            completed_on("last-week", 2023, 12, 31),
        ];
        let weekly = weekly_practice(&attempts, date(2024, 1, 7), &utc());
        assert_eq!(weekly.days, [true, false, true, false, false, false, true]);
        assert_eq!(weekly.today_index, 6);
        assert!(weekly.practiced_today);
    }

    #[test]
    fn weekly_practice_ignores_next_week() {
        let attempts = vec![completed_on("next", 2024, 1, 8)];
        let weekly = weekly_practice(&attempts, date(2024, 1, 3), &utc());
        assert_eq!(weekly.days, [false; 7]);
        assert_eq!(weekly.today_index, 2);
        assert!(!weekly.practiced_today);
    }

    #[test]
    fn total_practice_days_counts_distinct_days() {
        let attempts = vec![
            completed_on("a", 2024, 1, 1),
            completed_on("b", 2024, 1, 1),
            completed_on("c", 2024, 1, 9),
        ];
        assert_eq!(total_practice_days(&attempts, &utc()), 2);
        assert_eq!(total_practice_days(&[], &utc()), 0);
    }

    #[test]
    fn streak_message_tiers() {
        assert!(streak_message(7, true).starts_with("Amazing"));
        assert!(streak_message(3, true).starts_with("Great job"));
        assert!(streak_message(1, true).starts_with("Well done"));
        assert!(streak_message(4, false).starts_with("Keep it up"));
        assert!(streak_message(0, false).starts_with("Start your streak"));
    }

    #[test]
    fn streak_summary_reads_counters_from_stats() {
        let stats = UserStats {
            current_streak: 3,
            longest_streak: 9,
            ..UserStats::default()
        };
        let attempts = vec![completed_on("a", 2024, 1, 2)];
        let summary = streak_summary(&stats, &attempts, date(2024, 1, 2), &utc());
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.longest_streak, 9);
        assert_eq!(summary.total_practice_days, 1);
        assert!(summary.weekly.practiced_today);
        assert!(summary.message.starts_with("Great job"));
    }
}
