//! JSON reporter for machine-readable output

use crate::analytics::Dashboard;
use crate::history::HistoryEntry;
use crate::import::ImportReport;
use crate::scoring::{AttemptResult, BatchOutcome};
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn report_attempt(&self, test_name: &str, result: &AttemptResult) -> String {
        self.encode(
            &AttemptOutput {
                test_name,
                result,
            },
            "{}",
        )
    }

    pub fn report_batch(&self, batch: &BatchOutcome) -> String {
        self.encode(batch, "{}")
    }

    pub fn report_dashboard(&self, dashboard: &Dashboard) -> String {
        self.encode(dashboard, "{}")
    }

    pub fn report_history(&self, entries: &[HistoryEntry]) -> String {
        self.encode(entries, "[]")
    }

    pub fn report_import(&self, report: &ImportReport) -> String {
        self.encode(report, "{}")
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded.unwrap_or_else(|_| fallback.to_string())
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttemptOutput<'a> {
    test_name: &'a str,
    #[serde(flatten)]
    result: &'a AttemptResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsAggregator;
    use crate::{PerformanceBand, UserStats};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn make_result(score_percentage: f64) -> AttemptResult {
        AttemptResult {
            attempt_id: "a1".to_string(),
            test_id: "t1".to_string(),
            total_score: score_percentage / 20.0,
            total_marks: 5,
            score_percentage,
            accuracy: 0.5,
            attempted_count: 4,
            correct_count: 2,
            incorrect_count: 2,
            unattempted_count: 1,
            subject_breakdown: BTreeMap::new(),
            avg_time_per_question_secs: 12,
            weak_subjects: vec![],
            questions: vec![],
            band: PerformanceBand::from_percentage(score_percentage),
        }
    }

    #[test]
    fn test_attempt_has_expected_keys() {
        let json = JsonReporter::new().report_attempt("Physics Mock", &make_result(26.8));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["testName"], "Physics Mock");
        assert_eq!(parsed["attemptId"], "a1");
        assert_eq!(parsed["scorePercentage"], 26.8);
        assert_eq!(parsed["totalMarks"], 5);
        assert_eq!(parsed["band"], "needsImprovement");
        assert!(parsed.get("subjectBreakdown").is_some());
        assert!(parsed.get("weakSubjects").is_some());
    }

    #[test]
    fn test_pretty_output() {
        let json = JsonReporter::new()
            .pretty()
            .report_attempt("t", &make_result(80.0));
        assert!(json.contains('\n'), "pretty JSON should have newlines");
        assert!(json.contains("  "), "pretty JSON should have indentation");
    }

    #[test]
    fn test_dashboard_json_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let dash = AnalyticsAggregator::default().dashboard(&UserStats::default(), &[], today);
        let json = JsonReporter::new().report_dashboard(&dash);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["today"], "2024-01-10");
        assert_eq!(parsed["trend"]["status"], "insufficientData");
        assert_eq!(parsed["distribution"]["buckets"], serde_json::json!([0, 0, 0, 0]));
        assert_eq!(parsed["milestones"]["next"], 1);
        assert_eq!(parsed["streak"]["weekly"]["todayIndex"], 2);
        assert!(parsed["engagement"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_history_empty_is_array() {
        let json = JsonReporter::new().report_history(&[]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }

    #[test]
    fn test_history_entry_keys() {
        let entry = HistoryEntry {
            attempt_id: "a1".to_string(),
            test_id: "t1".to_string(),
            display_name: "Evening run".to_string(),
            score: 55.0,
            total_questions: 20,
            started_at: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
        };
        let json = JsonReporter::new().report_history(&[entry]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["displayName"], "Evening run");
        assert_eq!(parsed[0]["totalQuestions"], 20);
    }
}
