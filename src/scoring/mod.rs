//! Scoring - per-attempt results and batch scoring of a history

pub mod batch;
pub mod engine;

pub use batch::{score_history, BatchFailure, BatchOutcome};
pub use engine::{
    AttemptResult, QuestionOutcome, ScoringEngine, ScoringError, SubjectScore, Verdict,
    DEFAULT_MAX_WEAK_SUBJECTS, DEFAULT_WEAK_SUBJECT_THRESHOLD,
};
