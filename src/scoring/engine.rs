//! Score calculation for a single test attempt

use crate::config::Config;
use crate::{MockTest, PerformanceBand, TestAttempt, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Subjects below this accuracy are reported as weak
pub const DEFAULT_WEAK_SUBJECT_THRESHOLD: f64 = 0.7;
/// At most this many weak subjects are reported
pub const DEFAULT_MAX_WEAK_SUBJECTS: usize = 2;

/// Precondition violations: the test is malformed or the attempt does not fit it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("invalid test definition: {0}")]
    InvalidTest(#[from] ValidationError),
    #[error("attempt {attempt_id} belongs to test {found}, not {expected}")]
    TestMismatch {
        attempt_id: String,
        expected: String,
        found: String,
    },
    #[error("attempt {attempt_id} answers unknown question {question_id}")]
    UnknownQuestion {
        attempt_id: String,
        question_id: String,
    },
    #[error("question {question_id}: selected option {index} is out of range ({option_count} options)")]
    SelectionOutOfRange {
        question_id: String,
        index: usize,
        option_count: usize,
    },
}

/// Outcome of a single question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unattempted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: String,
    pub subject: String,
    pub selected: Option<usize>,
    /// `None` for questions that cannot be auto-graded
    pub correct_index: Option<usize>,
    pub verdict: Verdict,
    pub time_spent_secs: u32,
}

/// Attempted/correct counts restricted to one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    /// Questions of this subject in the test
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
}

impl SubjectScore {
    pub fn accuracy(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempted as f64
        }
    }
}

/// Everything derived from one attempt against its test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub attempt_id: String,
    pub test_id: String,
    /// Raw score after negative marking; may be fractional or negative
    pub total_score: f64,
    /// One mark per question
    pub total_marks: usize,
    /// Not clamped: heavy negative marking yields a negative percentage
    pub score_percentage: f64,
    /// Correct over attempted, ignoring negative marking (0..=1)
    pub accuracy: f64,
    pub attempted_count: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub unattempted_count: usize,
    pub subject_breakdown: BTreeMap<String, SubjectScore>,
    /// Integer seconds, averaged over attempted questions
    pub avg_time_per_question_secs: u32,
    /// Lowest-accuracy subjects first
    pub weak_subjects: Vec<String>,
    pub questions: Vec<QuestionOutcome>,
    pub band: PerformanceBand,
}

/// Scores attempts against their test definitions
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    weak_subject_threshold: f64,
    max_weak_subjects: usize,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self {
            weak_subject_threshold: DEFAULT_WEAK_SUBJECT_THRESHOLD,
            max_weak_subjects: DEFAULT_MAX_WEAK_SUBJECTS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            weak_subject_threshold: config
                .weak_subject_threshold
                .unwrap_or(DEFAULT_WEAK_SUBJECT_THRESHOLD),
            max_weak_subjects: config.max_weak_subjects.unwrap_or(DEFAULT_MAX_WEAK_SUBJECTS),
        }
    }

    pub fn with_weak_subject_threshold(mut self, threshold: f64) -> Self {
        self.weak_subject_threshold = threshold;
        self
    }

    pub fn with_max_weak_subjects(mut self, max: usize) -> Self {
        self.max_weak_subjects = max;
        self
    }

    /// Score `attempt` against `test`.
    ///
    /// Degenerate inputs (no questions, nothing attempted) produce zeros. An
    /// attempt that references another test, answers a question the test does
    /// not contain, or selects a non-existent option is rejected.
    pub fn compute_attempt_result(
        &self,
        test: &MockTest,
        attempt: &TestAttempt,
    ) -> Result<AttemptResult, ScoringError> {
        Self::check_preconditions(test, attempt)?;

        let mut questions = Vec::with_capacity(test.questions.len());
        let mut subject_breakdown: BTreeMap<String, SubjectScore> = BTreeMap::new();
        let mut total_time: u64 = 0;

        for question in &test.questions {
            let answer = attempt.user_answers.get(&question.id);
            let selected = answer.and_then(|a| a.selected_option_index);
            let correct_index = question.kind.correct_index();
            let verdict = match selected {
                None => Verdict::Unattempted,
                Some(index) if correct_index == Some(index) => Verdict::Correct,
                Some(_) => Verdict::Incorrect,
            };
            let time_spent_secs = answer.map(|a| a.time_spent_secs).unwrap_or(0);
            if selected.is_some() {
                total_time += time_spent_secs as u64;
            }

            let subject = subject_breakdown.entry(question.subject.clone()).or_default();
            subject.total += 1;
            if verdict != Verdict::Unattempted {
                subject.attempted += 1;
            }
            if verdict == Verdict::Correct {
                subject.correct += 1;
            }

            questions.push(QuestionOutcome {
                question_id: question.id.clone(),
                subject: question.subject.clone(),
                selected,
                correct_index,
                verdict,
                time_spent_secs,
            });
        }

        let attempted_count = questions
            .iter()
            .filter(|q| q.verdict != Verdict::Unattempted)
            .count();
        let correct_count = questions
            .iter()
            .filter(|q| q.verdict == Verdict::Correct)
            .count();
        let incorrect_count = attempted_count - correct_count;
        let total_marks = test.questions.len();

        let total_score = correct_count as f64 - incorrect_count as f64 * test.penalty();
        let score_percentage = if total_marks > 0 {
            total_score / total_marks as f64 * 100.0
        } else {
            0.0
        };
        let accuracy = if attempted_count > 0 {
            correct_count as f64 / attempted_count as f64
        } else {
            0.0
        };
        let avg_time_per_question_secs = if attempted_count > 0 {
            (total_time / attempted_count as u64) as u32
        } else {
            0
        };
        let weak_subjects = self.weak_subjects(&subject_breakdown);

        tracing::debug!(
            attempt = %attempt.id,
            test = %test.id,
            attempted_count,
            correct_count,
            total_score,
            "scored attempt"
        );

        Ok(AttemptResult {
            attempt_id: attempt.id.clone(),
            test_id: test.id.clone(),
            total_score,
            total_marks,
            score_percentage,
            accuracy,
            attempted_count,
            correct_count,
            incorrect_count,
            unattempted_count: total_marks - attempted_count,
            subject_breakdown,
            avg_time_per_question_secs,
            weak_subjects,
            questions,
            band: PerformanceBand::from_percentage(score_percentage),
        })
    }

    /// Score and close an attempt: marks it completed and stores the score percentage
    pub fn finalize_attempt(
        &self,
        test: &MockTest,
        attempt: &TestAttempt,
        ended_at: DateTime<Utc>,
    ) -> Result<(TestAttempt, AttemptResult), ScoringError> {
        let result = self.compute_attempt_result(test, attempt)?;
        let mut finalized = attempt.clone();
        finalized.is_completed = true;
        finalized.score = result.score_percentage;
        finalized.end_time = Some(ended_at);
        Ok((finalized, result))
    }

    fn check_preconditions(test: &MockTest, attempt: &TestAttempt) -> Result<(), ScoringError> {
        test.validate()?;
        if attempt.test_id != test.id {
            return Err(ScoringError::TestMismatch {
                attempt_id: attempt.id.clone(),
                expected: test.id.clone(),
                found: attempt.test_id.clone(),
            });
        }

        for (question_id, answer) in &attempt.user_answers {
            let Some(question) = test.question(question_id) else {
                return Err(ScoringError::UnknownQuestion {
                    attempt_id: attempt.id.clone(),
                    question_id: question_id.clone(),
                });
            };
            if let Some(index) = answer.selected_option_index {
                let option_count = question.kind.option_count();
                if index >= option_count {
                    return Err(ScoringError::SelectionOutOfRange {
                        question_id: question_id.clone(),
                        index,
                        option_count,
                    });
                }
            }
        }
        Ok(())
    }

    fn weak_subjects(&self, breakdown: &BTreeMap<String, SubjectScore>) -> Vec<String> {
        let mut weak: Vec<(&String, f64)> = breakdown
            .iter()
            .filter(|(_, s)| s.attempted > 0 && s.accuracy() < self.weak_subject_threshold)
            .map(|(name, s)| (name, s.accuracy()))
            .collect();
        // Stable sort keeps alphabetical order among equal ratios
        weak.sort_by(|a, b| a.1.total_cmp(&b.1));
        weak.into_iter()
            .take(self.max_weak_subjects)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
