//! Overall accuracy and per-subject ranking from running stats

use crate::UserStats;
use serde::Serialize;

/// Accuracy ratio plus the pie-chart split it drives
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracySplit {
    /// Correct over answered (0..=1)
    pub ratio: f64,
    /// Degrees of the correct slice
    pub correct_sweep: f64,
    /// Degrees of the incorrect slice; 0 when nothing has been answered
    pub incorrect_sweep: f64,
}

pub fn overall_accuracy(stats: &UserStats) -> AccuracySplit {
    if stats.questions_answered == 0 {
        return AccuracySplit {
            ratio: 0.0,
            correct_sweep: 0.0,
            incorrect_sweep: 0.0,
        };
    }
    // Stats with more correct than answered are clamped to a full circle
    let ratio = (stats.correct_answers as f64 / stats.questions_answered as f64).clamp(0.0, 1.0);
    AccuracySplit {
        ratio,
        correct_sweep: ratio * 360.0,
        incorrect_sweep: (1.0 - ratio) * 360.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAccuracy {
    pub subject: String,
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: f64,
}

/// Subjects ordered by accuracy, best first; ties broken by name
pub fn subject_ranking(stats: &UserStats) -> Vec<SubjectAccuracy> {
    let mut ranking: Vec<SubjectAccuracy> = stats
        .subject_performance
        .iter()
        .map(|(subject, perf)| SubjectAccuracy {
            subject: subject.clone(),
            attempted: perf.attempted,
            correct: perf.correct,
            accuracy: perf.accuracy(),
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.accuracy
            .total_cmp(&a.accuracy)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    ranking
}
