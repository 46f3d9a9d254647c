//! Score histogram over four quarter ranges

use crate::TestAttempt;
use serde::Serialize;

/// Lower bounds of the buckets `[0,25) [25,50) [50,75) [75,100]`
pub const BUCKET_BOUNDS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];
pub const BUCKET_LABELS: [&str; 4] = ["0-25%", "25-50%", "50-75%", "75-100%"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDistribution {
    pub buckets: [usize; 4],
    /// All zeros when there are no scores
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of scores considered, including any outside 0..=100
    pub count: usize,
}

impl ScoreDistribution {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

pub fn score_distribution(attempts: &[TestAttempt]) -> ScoreDistribution {
    let scores: Vec<f64> = attempts
        .iter()
        .filter(|a| a.is_completed)
        .map(|a| a.score)
        .collect();

    let mut buckets = [0usize; 4];
    for (i, bucket) in buckets.iter_mut().enumerate() {
        let (low, high) = (BUCKET_BOUNDS[i], BUCKET_BOUNDS[i + 1]);
        *bucket = scores.iter().filter(|&&s| s >= low && s < high).count();
    }
    // The top range is closed: a perfect score lands in the last bucket
    buckets[3] += scores.iter().filter(|&&s| s == 100.0).count();

    if scores.is_empty() {
        return ScoreDistribution {
            buckets,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            count: 0,
        };
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    ScoreDistribution {
        buckets,
        min,
        max,
        mean,
        count: scores.len(),
    }
}
