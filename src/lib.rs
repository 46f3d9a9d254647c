//! MockMate: scoring and performance analytics for mock-test practice
//!
//! This library scores completed mock-test attempts (raw score with negative
//! marking, accuracy, subject breakdowns) and aggregates an attempt history into
//! chart-ready statistics. Everything here is a pure function over in-memory
//! snapshots; loading and saving those snapshots lives in [`history`].

pub mod analytics;
pub mod config;
pub mod history;
pub mod import;
pub mod reporter;
pub mod scoring;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Difficulty tier shared by questions and whole tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            _ => Err(s.to_string()),
        }
    }
}

/// What a question asks for, and how its answer is checked.
///
/// Only kinds with an option list can be auto-graded; the correct index is
/// stored next to the options so it is never looked up in a missing list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuestionKind {
    /// Pick one of several options
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    /// Options are implicitly `["True", "False"]`
    TrueFalse { answer: bool },
    /// Free-form answer; never auto-graded
    Descriptive,
}

impl QuestionKind {
    /// Index of the correct option, if this kind is auto-gradable
    pub fn correct_index(&self) -> Option<usize> {
        match self {
            QuestionKind::MultipleChoice { correct_index, .. } => Some(*correct_index),
            QuestionKind::TrueFalse { answer } => Some(if *answer { 0 } else { 1 }),
            QuestionKind::Descriptive => None,
        }
    }

    /// Number of selectable options (0 for descriptive questions)
    pub fn option_count(&self) -> usize {
        match self {
            QuestionKind::MultipleChoice { options, .. } => options.len(),
            QuestionKind::TrueFalse { .. } => 2,
            QuestionKind::Descriptive => 0,
        }
    }

    /// Text of the option at `index`, if any
    pub fn option(&self, index: usize) -> Option<&str> {
        match self {
            QuestionKind::MultipleChoice { options, .. } => options.get(index).map(String::as_str),
            QuestionKind::TrueFalse { .. } => ["True", "False"].get(index).copied(),
            QuestionKind::Descriptive => None,
        }
    }
}

/// A single question belonging to a mock test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub explanation: String,
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// A test definition: ordered questions plus marking rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockTest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    /// Time limit in minutes
    pub time_limit_minutes: u32,
    #[serde(default)]
    pub negative_marking: bool,
    /// Fraction deducted per wrong answer; only meaningful with negative marking
    #[serde(default)]
    pub negative_marking_value: f64,
}

impl MockTest {
    /// Per-question penalty actually applied (0 when negative marking is off)
    pub fn penalty(&self) -> f64 {
        if self.negative_marking {
            self.negative_marking_value
        } else {
            0.0
        }
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Check the structural invariants of the test definition
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.negative_marking && self.negative_marking_value < 0.0 {
            return Err(ValidationError::NegativePenalty {
                value: self.negative_marking_value,
            });
        }
        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(ValidationError::DuplicateQuestionId {
                    question_id: question.id.clone(),
                });
            }
            if let QuestionKind::MultipleChoice {
                options,
                correct_index,
            } = &question.kind
            {
                if options.is_empty() {
                    return Err(ValidationError::EmptyOptions {
                        question_id: question.id.clone(),
                    });
                }
                if *correct_index >= options.len() {
                    return Err(ValidationError::CorrectIndexOutOfRange {
                        question_id: question.id.clone(),
                        index: *correct_index,
                        option_count: options.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Structural problems in a test definition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("question {question_id} has no options")]
    EmptyOptions { question_id: String },
    #[error("question {question_id}: correct option {index} is out of range ({option_count} options)")]
    CorrectIndexOutOfRange {
        question_id: String,
        index: usize,
        option_count: usize,
    },
    #[error("negative marking value must not be negative (got {value})")]
    NegativePenalty { value: f64 },
    #[error("question id {question_id} appears more than once")]
    DuplicateQuestionId { question_id: String },
}

/// Per-question state recorded during an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerStatus {
    #[default]
    Unattempted,
    Answered,
    Bookmarked,
    MarkedForReview,
}

/// The user's answer to one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    /// Selected option; `None` means unattempted
    pub selected_option_index: Option<usize>,
    #[serde(default)]
    pub status: AnswerStatus,
    /// Time spent on the question, in seconds
    #[serde(default)]
    pub time_spent_secs: u32,
}

impl UserAnswer {
    pub fn selected(index: usize, time_spent_secs: u32) -> Self {
        Self {
            selected_option_index: Some(index),
            status: AnswerStatus::Answered,
            time_spent_secs,
        }
    }

    pub fn skipped(time_spent_secs: u32) -> Self {
        Self {
            selected_option_index: None,
            status: AnswerStatus::Unattempted,
            time_spent_secs,
        }
    }

    pub fn is_attempted(&self) -> bool {
        self.selected_option_index.is_some()
    }
}

/// One sitting of a mock test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAttempt {
    pub id: String,
    pub test_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Answers keyed by question id
    #[serde(default)]
    pub user_answers: BTreeMap<String, UserAnswer>,
    #[serde(default)]
    pub is_completed: bool,
    /// Final score percentage (negative-marking adjusted), set on submission
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

impl TestAttempt {
    pub fn new(id: impl Into<String>, test_id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            test_id: test_id.into(),
            start_time,
            end_time: None,
            user_answers: BTreeMap::new(),
            is_completed: false,
            score: 0.0,
            custom_name: None,
        }
    }

    /// Record (or replace) the answer for a question
    pub fn answer(&mut self, question_id: impl Into<String>, answer: UserAnswer) {
        self.user_answers.insert(question_id.into(), answer);
    }
}

/// Attempted/correct counters for one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub attempted: u32,
    pub correct: u32,
}

impl SubjectPerformance {
    pub fn accuracy(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempted as f64
        }
    }
}

/// Running counters across all completed attempts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub questions_answered: u32,
    #[serde(default)]
    pub correct_answers: u32,
    /// Consecutive days with at least one completed attempt
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub subject_performance: BTreeMap<String, SubjectPerformance>,
}

/// Feedback band for a score percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Progress,
    NeedsImprovement,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            PerformanceBand::Excellent
        } else if percentage >= 60.0 {
            PerformanceBand::Good
        } else if percentage >= 40.0 {
            PerformanceBand::Progress
        } else {
            PerformanceBand::NeedsImprovement
        }
    }

    pub fn feedback(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent! You've mastered this material.",
            PerformanceBand::Good => "Good job! You have a solid understanding of the material.",
            PerformanceBand::Progress => {
                "You're making progress, but should review some concepts."
            }
            PerformanceBand::NeedsImprovement => {
                "You need to focus on improving your understanding of this material."
            }
        }
    }
}

impl std::fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceBand::Excellent => write!(f, "Excellent"),
            PerformanceBand::Good => write!(f, "Good"),
            PerformanceBand::Progress => write!(f, "Progress"),
            PerformanceBand::NeedsImprovement => write!(f, "Needs Improvement"),
        }
    }
}

/// Public API: score one attempt from a history file.
///
/// * `history_path` - JSON snapshot of tests, attempts and stats
/// * `attempt_id` - the attempt to score
pub fn score_attempt_file(
    history_path: &std::path::Path,
    attempt_id: &str,
) -> anyhow::Result<scoring::AttemptResult> {
    use history::Repository;

    let history = history::load_history(history_path)?;
    let attempt = history
        .attempts()
        .iter()
        .find(|a| a.id == attempt_id)
        .ok_or_else(|| anyhow::anyhow!("Attempt not found: {}", attempt_id))?;
    let test = history
        .test_by_id(&attempt.test_id)
        .ok_or_else(|| anyhow::anyhow!("Test not found for attempt {}: {}", attempt_id, attempt.test_id))?;
    Ok(scoring::ScoringEngine::new().compute_attempt_result(test, attempt)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(id: &str, options: &[&str], correct_index: usize) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {}", id),
            kind: QuestionKind::MultipleChoice {
                options: options.iter().map(|s| s.to_string()).collect(),
                correct_index,
            },
            explanation: String::new(),
            subject: "Polity".to_string(),
            topic: String::new(),
            difficulty: Difficulty::Medium,
        }
    }

    fn test_with(questions: Vec<Question>) -> MockTest {
        MockTest {
            id: "t1".to_string(),
            name: "Prelims Mock 1".to_string(),
            difficulty: Difficulty::Medium,
            questions,
            time_limit_minutes: 120,
            negative_marking: true,
            negative_marking_value: 0.33,
        }
    }

    #[test]
    fn penalty_is_zero_without_negative_marking() {
        let mut test = test_with(vec![]);
        assert_eq!(test.penalty(), 0.33);
        test.negative_marking = false;
        assert_eq!(test.penalty(), 0.0);
    }

    #[test]
    fn validate_rejects_out_of_range_correct_index() {
        let test = test_with(vec![mcq("q1", &["a", "b"], 2)]);
        assert_eq!(
            test.validate(),
            Err(ValidationError::CorrectIndexOutOfRange {
                question_id: "q1".to_string(),
                index: 2,
                option_count: 2,
            })
        );
    }

    #[test]
    fn validate_rejects_empty_options() {
        let test = test_with(vec![mcq("q1", &[], 0)]);
        assert!(matches!(
            test.validate(),
            Err(ValidationError::EmptyOptions { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_question_ids() {
        let test = test_with(vec![
            mcq("q1", &["a", "b"], 0),
            mcq("q2", &["a", "b"], 1),
            mcq("q1", &["c", "d"], 1),
        ]);
        assert_eq!(
            test.validate(),
            Err(ValidationError::DuplicateQuestionId {
                question_id: "q1".to_string(),
            })
        );
    }

    #[test]
    fn validate_accepts_well_formed_test() {
        let test = test_with(vec![mcq("q1", &["a", "b", "c", "d"], 3)]);
        assert!(test.validate().is_ok());
    }

    #[test]
    fn true_false_maps_answer_to_index() {
        assert_eq!(QuestionKind::TrueFalse { answer: true }.correct_index(), Some(0));
        assert_eq!(QuestionKind::TrueFalse { answer: false }.correct_index(), Some(1));
        assert_eq!(QuestionKind::TrueFalse { answer: false }.option(1), Some("False"));
        assert_eq!(QuestionKind::Descriptive.correct_index(), None);
        assert_eq!(QuestionKind::Descriptive.option_count(), 0);
    }

    #[test]
    fn question_serializes_with_flattened_kind() {
        let q = mcq("q1", &["a", "b"], 1);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["kind"], "multipleChoice");
        assert_eq!(json["correctIndex"], 1);
        assert_eq!(json["difficulty"], "MEDIUM");

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn performance_band_thresholds() {
        assert_eq!(PerformanceBand::from_percentage(100.0), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::from_percentage(80.0), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::from_percentage(79.9), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_percentage(60.0), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_percentage(40.0), PerformanceBand::Progress);
        assert_eq!(PerformanceBand::from_percentage(39.9), PerformanceBand::NeedsImprovement);
        assert_eq!(PerformanceBand::from_percentage(-12.0), PerformanceBand::NeedsImprovement);
    }

    #[test]
    fn subject_accuracy_zero_when_nothing_attempted() {
        assert_eq!(SubjectPerformance::default().accuracy(), 0.0);
        let perf = SubjectPerformance {
            attempted: 4,
            correct: 3,
        };
        assert_eq!(perf.accuracy(), 0.75);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" EASY ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("extreme".parse::<Difficulty>().is_err());
    }
}
