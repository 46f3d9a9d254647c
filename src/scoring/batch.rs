//! Batch scoring of every completed attempt in a repository

use super::engine::{AttemptResult, ScoringEngine};
use crate::history::Repository;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// An attempt that could not be scored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub attempt_id: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Results keyed by attempt id
    pub results: BTreeMap<String, AttemptResult>,
    pub failures: Vec<BatchFailure>,
}

/// Score all completed attempts in parallel. Attempts whose test is missing or
/// which violate scoring preconditions are reported in `failures`.
pub fn score_history<R>(engine: &ScoringEngine, repository: &R) -> BatchOutcome
where
    R: Repository + Sync,
{
    let scored: Vec<(String, Result<AttemptResult, String>)> = repository
        .attempts()
        .par_iter()
        .filter(|attempt| attempt.is_completed)
        .map(|attempt| {
            let outcome = match repository.test_by_id(&attempt.test_id) {
                Some(test) => engine
                    .compute_attempt_result(test, attempt)
                    .map_err(|e| e.to_string()),
                None => Err(format!("test {} not found", attempt.test_id)),
            };
            (attempt.id.clone(), outcome)
        })
        .collect();

    let mut batch = BatchOutcome::default();
    for (attempt_id, outcome) in scored {
        match outcome {
            Ok(result) => {
                batch.results.insert(attempt_id, result);
            }
            Err(reason) => {
                tracing::warn!(attempt = %attempt_id, %reason, "skipping attempt");
                batch.failures.push(BatchFailure { attempt_id, reason });
            }
        }
    }
    batch
}
