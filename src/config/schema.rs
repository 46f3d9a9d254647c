//! Config schema and deserialization

use serde::{Deserialize, Serialize};

/// Root config structure for .mockmaterc.json
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Attempt-count milestones. Default: 1, 5, 10, 20, 50, 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<u32>>,

    /// Subjects below this accuracy (0..=1) are weak. Default: 0.7
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weak_subject_threshold: Option<f64>,

    /// Cap on reported weak subjects. Default: 2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weak_subjects: Option<usize>,

    /// Number of most recent active days in the engagement chart. Default: 7
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_days: Option<usize>,

    /// Local offset from UTC used to group attempts by day. Default: 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,

    /// Minimum score percentage for `score` (exit 1 if below). Default: none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_threshold: Option<f64>,

    /// Glob patterns for files/directories to skip when importing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, cli_threshold: Option<f64>) -> Self {
        if cli_threshold.is_some() {
            self.pass_threshold = cli_threshold;
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.milestones.is_none() {
            self.milestones = base.milestones;
        }
        if self.weak_subject_threshold.is_none() {
            self.weak_subject_threshold = base.weak_subject_threshold;
        }
        if self.max_weak_subjects.is_none() {
            self.max_weak_subjects = base.max_weak_subjects;
        }
        if self.engagement_days.is_none() {
            self.engagement_days = base.engagement_days;
        }
        if self.utc_offset_minutes.is_none() {
            self.utc_offset_minutes = base.utc_offset_minutes;
        }
        if self.pass_threshold.is_none() {
            self.pass_threshold = base.pass_threshold;
        }

        // Merge ignore patterns
        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;
    }

    /// Config written by `mockmate init`
    pub fn starter(pass_threshold: Option<f64>) -> Self {
        Self {
            milestones: Some(crate::analytics::DEFAULT_MILESTONES.to_vec()),
            weak_subject_threshold: Some(crate::scoring::DEFAULT_WEAK_SUBJECT_THRESHOLD),
            max_weak_subjects: Some(crate::scoring::DEFAULT_MAX_WEAK_SUBJECTS),
            engagement_days: Some(crate::analytics::DEFAULT_ENGAGEMENT_DAYS),
            utc_offset_minutes: Some(0),
            pass_threshold,
            ..Self::default()
        }
    }
}
