//! Score trend across attempts, oldest first

use crate::TestAttempt;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A trend line needs at least this many attempts
pub const MIN_TREND_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    /// Stored score percentage of the attempt
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AccuracyTrend {
    /// Fewer than two completed attempts
    InsufficientData { attempts: usize },
    Available {
        points: Vec<TrendPoint>,
        /// Mean of all point scores
        average: f64,
    },
}

impl AccuracyTrend {
    pub fn points(&self) -> &[TrendPoint] {
        match self {
            AccuracyTrend::InsufficientData { .. } => &[],
            AccuracyTrend::Available { points, .. } => points,
        }
    }
}

pub fn accuracy_trend(attempts: &[TestAttempt]) -> AccuracyTrend {
    let mut points: Vec<TrendPoint> = attempts
        .iter()
        .filter(|a| a.is_completed)
        .map(|a| TrendPoint {
            timestamp: a.start_time,
            score: a.score,
        })
        .collect();

    if points.len() < MIN_TREND_ATTEMPTS {
        return AccuracyTrend::InsufficientData {
            attempts: points.len(),
        };
    }

    points.sort_by_key(|p| p.timestamp);
    let average = points.iter().map(|p| p.score).sum::<f64>() / points.len() as f64;
    AccuracyTrend::Available { points, average }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn completed(id: &str, day: u32, score: f64) -> TestAttempt {
        let mut attempt = TestAttempt::new(
            id,
            "t1",
            Utc.with_ymd_and_hms(2024, 4, day, 7, 30, 0).unwrap(),
        );
        attempt.is_completed = true;
        attempt.score = score;
        attempt
    }

    #[test]
    fn trend_needs_two_attempts() {
        assert_eq!(
            accuracy_trend(&[]),
            AccuracyTrend::InsufficientData { attempts: 0 }
        );
        assert_eq!(
            accuracy_trend(&[completed("a", 1, 50.0)]),
            AccuracyTrend::InsufficientData { attempts: 1 }
        );
    }

    #[test]
    fn trend_sorts_by_start_time_and_averages() {
        let attempts = vec![
            completed("c", 9, 70.0),
            completed("a", 2, 40.0),
            completed("b", 5, 55.0),
        ];
        let trend = accuracy_trend(&attempts);
        let scores: Vec<f64> = trend.points().iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![40.0, 55.0, 70.0]);
        match trend {
            AccuracyTrend::Available { average, .. } => assert_eq!(average, 55.0),
            other => panic!("expected trend, got {:?}", other),
        }
    }

    #[test]
    fn trend_ignores_incomplete_attempts() {
        let mut draft = completed("draft", 3, 99.0);
        draft.is_completed = false;
        let trend = accuracy_trend(&[completed("a", 1, 20.0), draft]);
        assert_eq!(trend, AccuracyTrend::InsufficientData { attempts: 1 });
    }

    #[test]
    fn trend_keeps_negative_scores() {
        let trend = accuracy_trend(&[completed("a", 1, -10.0), completed("b", 2, 30.0)]);
        match trend {
            AccuracyTrend::Available { points, average } => {
                assert_eq!(points[0].score, -10.0);
                assert_eq!(average, 10.0);
            }
            other => panic!("expected trend, got {:?}", other),
        }
    }
}
