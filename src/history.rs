//! Attempt history - the JSON snapshot of tests, attempts and stats

use crate::{MockTest, TestAttempt, UserStats};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Read access to the tests, attempts and stats the computations run over
pub trait Repository {
    fn tests(&self) -> &[MockTest];
    fn attempts(&self) -> &[TestAttempt];
    fn user_stats(&self) -> &UserStats;
    fn settings(&self) -> &Settings;

    fn test_by_id(&self, id: &str) -> Option<&MockTest> {
        self.tests().iter().find(|t| t.id == id)
    }

    fn attempt_by_id(&self, id: &str) -> Option<&TestAttempt> {
        self.attempts().iter().find(|a| a.id == id)
    }
}

/// Display preferences; not used by any computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub pulsating_badge: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFile {
    #[serde(default)]
    pub tests: Vec<MockTest>,
    #[serde(default)]
    pub attempts: Vec<TestAttempt>,
    #[serde(default)]
    pub stats: UserStats,
    #[serde(default)]
    pub settings: Settings,
}

impl Repository for HistoryFile {
    fn tests(&self) -> &[MockTest] {
        &self.tests
    }

    fn attempts(&self) -> &[TestAttempt] {
        &self.attempts
    }

    fn user_stats(&self) -> &UserStats {
        &self.stats
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("attempt not found: {0}")]
    AttemptNotFound(String),
    #[error("name cannot be empty")]
    BlankName,
}

/// Load a history file. A missing file is an error; use `HistoryFile::default()`
/// to start from nothing.
pub fn load_history(path: &Path) -> Result<HistoryFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history: {}", path.display()))?;
    let history: HistoryFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in history: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        tests = history.tests.len(),
        attempts = history.attempts.len(),
        "loaded history"
    );
    Ok(history)
}

/// Load a history file, or an empty history if it does not exist yet
pub fn load_or_default(path: &Path) -> Result<HistoryFile> {
    if path.exists() {
        load_history(path)
    } else {
        Ok(HistoryFile::default())
    }
}

pub fn save_history(path: &Path, history: &HistoryFile) -> Result<()> {
    let content = serde_json::to_string_pretty(history).context("Failed to serialize history")?;
    fs::write(path, content).with_context(|| format!("Failed to write history: {}", path.display()))
}

/// Sort key for the history listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySort {
    #[default]
    Date,
    Score,
    TestName,
}

impl std::str::FromStr for HistorySort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(HistorySort::Date),
            "score" => Ok(HistorySort::Score),
            "name" | "test-name" | "testname" => Ok(HistorySort::TestName),
            other => Err(format!("unknown sort key: {} (expected date, score or name)", other)),
        }
    }
}

/// One row of the history listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub attempt_id: String,
    pub test_id: String,
    /// Custom name when set, else the test's name
    pub display_name: String,
    pub score: f64,
    pub total_questions: usize,
    pub started_at: DateTime<Utc>,
}

/// Completed attempts joined with their tests, sorted by `sort`
pub fn list_history<R: Repository>(
    repository: &R,
    sort: HistorySort,
    ascending: bool,
) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = repository
        .attempts()
        .iter()
        .filter(|a| a.is_completed)
        .map(|attempt| {
            let test = repository.test_by_id(&attempt.test_id);
            let display_name = attempt
                .custom_name
                .clone()
                .or_else(|| test.map(|t| t.name.clone()))
                .unwrap_or_else(|| attempt.test_id.clone());
            HistoryEntry {
                attempt_id: attempt.id.clone(),
                test_id: attempt.test_id.clone(),
                display_name,
                score: attempt.score,
                total_questions: test.map(|t| t.questions.len()).unwrap_or(0),
                started_at: attempt.start_time,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        let ordering = match sort {
            HistorySort::Date => a.started_at.cmp(&b.started_at),
            HistorySort::Score => a.score.total_cmp(&b.score),
            HistorySort::TestName => a
                .display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase()),
        };
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    entries
}

/// Give an attempt a custom display name
pub fn rename_attempt(
    history: &mut HistoryFile,
    attempt_id: &str,
    name: &str,
) -> std::result::Result<(), HistoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HistoryError::BlankName);
    }
    let attempt = history
        .attempts
        .iter_mut()
        .find(|a| a.id == attempt_id)
        .ok_or_else(|| HistoryError::AttemptNotFound(attempt_id.to_string()))?;
    attempt.custom_name = Some(name.to_string());
    Ok(())
}

/// Remove an attempt. Running stats are left as they are.
pub fn delete_attempt(
    history: &mut HistoryFile,
    attempt_id: &str,
) -> std::result::Result<TestAttempt, HistoryError> {
    let index = history
        .attempts
        .iter()
        .position(|a| a.id == attempt_id)
        .ok_or_else(|| HistoryError::AttemptNotFound(attempt_id.to_string()))?;
    Ok(history.attempts.remove(index))
}

/// Add a test, replacing any existing test with the same id
pub fn add_test(history: &mut HistoryFile, test: MockTest) {
    match history.tests.iter_mut().find(|t| t.id == test.id) {
        Some(existing) => *existing = test,
        None => history.tests.push(test),
    }
}
