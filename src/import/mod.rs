//! Test import from JSON files

mod schema;

pub use schema::{ImportedQuestion, ImportedTest, DEFAULT_NEGATIVE_MARKING_VALUE};

use crate::config::is_ignored;
use crate::{Difficulty, MockTest, Question, QuestionKind, ValidationError};
use globset::GlobSet;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Hex digits kept from the SHA-256 of an id seed
const ID_HEX_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid test JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown difficulty '{0}' (expected EASY, MEDIUM or HARD)")]
    UnknownDifficulty(String),
    #[error("question {question_id} has no options")]
    EmptyOptions { question_id: String },
    #[error("question {question_id}: correct option {index} is out of range ({option_count} options)")]
    CorrectIndexOutOfRange {
        question_id: String,
        index: usize,
        option_count: usize,
    },
    #[error("test '{0}' has no questions")]
    NoQuestions(String),
    #[error("negative marking value must not be negative (got {0})")]
    NegativePenalty(f64),
    #[error("question id {question_id} appears more than once")]
    DuplicateQuestionId { question_id: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ValidationError> for ImportError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyOptions { question_id } => ImportError::EmptyOptions { question_id },
            ValidationError::CorrectIndexOutOfRange {
                question_id,
                index,
                option_count,
            } => ImportError::CorrectIndexOutOfRange {
                question_id,
                index,
                option_count,
            },
            ValidationError::NegativePenalty { value } => ImportError::NegativePenalty(value),
            ValidationError::DuplicateQuestionId { question_id } => {
                ImportError::DuplicateQuestionId { question_id }
            }
        }
    }
}

/// Parse and validate one test definition
pub fn parse_test(json: &str) -> Result<MockTest, ImportError> {
    let imported: ImportedTest = serde_json::from_str(json)?;
    into_mock_test(imported)
}

fn into_mock_test(imported: ImportedTest) -> Result<MockTest, ImportError> {
    if imported.questions.is_empty() {
        return Err(ImportError::NoQuestions(imported.name));
    }
    let difficulty = parse_difficulty(&imported.difficulty)?;
    let test_id = imported.id.clone().unwrap_or_else(|| {
        let mut seed = vec![imported.name.as_str()];
        seed.extend(imported.questions.iter().map(|q| q.text.as_str()));
        derive_id("test", &seed)
    });

    let questions = imported
        .questions
        .into_iter()
        .enumerate()
        .map(|(position, q)| {
            let difficulty = match q.difficulty.as_deref() {
                Some(d) => parse_difficulty(d)?,
                None => Difficulty::Medium,
            };
            let id = q.id.unwrap_or_else(|| {
                derive_id("q", &[imported.name.as_str(), &position.to_string(), &q.text])
            });
            Ok(Question {
                id,
                text: q.text,
                kind: QuestionKind::MultipleChoice {
                    options: q.options,
                    correct_index: q.correct_option_index,
                },
                explanation: q.explanation,
                subject: q.subject,
                topic: q.topic,
                difficulty,
            })
        })
        .collect::<Result<Vec<_>, ImportError>>()?;

    let test = MockTest {
        id: test_id,
        name: imported.name,
        difficulty,
        questions,
        time_limit_minutes: imported.time_limit,
        negative_marking: imported.negative_marking,
        negative_marking_value: imported.negative_marking_value,
    };
    test.validate()?;

    debug!(
        "Parsed test '{}' ({} questions, id {})",
        test.name,
        test.questions.len(),
        test.id
    );
    Ok(test)
}

fn parse_difficulty(value: &str) -> Result<Difficulty, ImportError> {
    value.parse().map_err(ImportError::UnknownDifficulty)
}

/// Stable id from a prefix and seed parts, so re-importing a file yields the same ids
fn derive_id(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", prefix, &digest[..ID_HEX_LEN])
}

pub fn import_file(path: &Path) -> Result<MockTest, ImportError> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_test(&content)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of importing every test file under a path
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub tests: Vec<MockTest>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Import a single file, or every `*.json` file below a directory that the
/// ignore set does not match. Files are visited in sorted order.
pub fn import_path(path: &Path, ignore_set: Option<&GlobSet>) -> ImportReport {
    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        find_test_files(path, ignore_set)
    };

    let mut report = ImportReport::default();
    for file in files {
        match import_file(&file) {
            Ok(test) => report.tests.push(test),
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                report.failures.push(ImportFailure {
                    path: file,
                    reason: e.to_string(),
                });
            }
        }
    }
    report
}

fn find_test_files(dir: &Path, ignore_set: Option<&GlobSet>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() || !is_json_file(file_path) {
            continue;
        }
        if let Some(set) = ignore_set {
            if is_ignored(file_path, set) {
                debug!("Ignoring {}", file_path.display());
                continue;
            }
        }
        files.push(file_path.to_path_buf());
    }

    // Sort for consistent output
    files.sort();
    files
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
