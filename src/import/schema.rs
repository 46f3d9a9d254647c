//! On-disk shape of an importable test file

use serde::Deserialize;

pub const DEFAULT_NEGATIVE_MARKING_VALUE: f64 = 0.33;

fn default_negative_marking_value() -> f64 {
    DEFAULT_NEGATIVE_MARKING_VALUE
}

/// Root object of a test import file
///
/// ```json
/// {
///   "name": "UPSC Prelims 2023",
///   "difficulty": "HARD",
///   "timeLimit": 120,
///   "negativeMarking": true,
///   "questions": [{ "text": "...", "options": ["a", "b"], "correctOptionIndex": 0,
///                   "explanation": "...", "subject": "Polity", "topic": "Constitution" }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedTest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub difficulty: String,
    /// Minutes
    pub time_limit: u32,
    #[serde(default)]
    pub negative_marking: bool,
    #[serde(default = "default_negative_marking_value")]
    pub negative_marking_value: f64,
    pub questions: Vec<ImportedQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedQuestion {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub explanation: String,
    pub subject: String,
    pub topic: String,
    /// Defaults to MEDIUM
    #[serde(default)]
    pub difficulty: Option<String>,
}
