//! Console reporter with colored output

use crate::analytics::{AccuracyTrend, Dashboard, BUCKET_LABELS};
use crate::history::{HistoryEntry, Settings};
use crate::import::ImportReport;
use crate::scoring::{AttemptResult, BatchOutcome};
use crate::PerformanceBand;
use colored::Colorize;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show per-question detail
    verbose: bool,
    /// Mark an active streak with a blinking badge
    pulsating_badge: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
            pulsating_badge: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Apply the display preferences stored with the history
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.pulsating_badge = settings.pulsating_badge;
        self
    }

    pub fn report_attempt(&self, test_name: &str, result: &AttemptResult) {
        print!("{}", self.render_attempt(test_name, result));
    }

    pub fn report_dashboard(&self, dashboard: &Dashboard) {
        print!("{}", self.render_dashboard(dashboard));
    }

    pub fn report_batch(&self, batch: &BatchOutcome) {
        print!("{}", self.render_batch(batch));
    }

    pub fn report_history(&self, entries: &[HistoryEntry]) {
        print!("{}", self.render_history(entries));
    }

    pub fn report_import(&self, report: &ImportReport) {
        print!("{}", self.render_import(report));
    }

    pub fn render_attempt(&self, test_name: &str, result: &AttemptResult) -> String {
        let mut out = String::new();
        out.push('\n');
        out.push_str(&format!("{}\n", format!("Test Result: {}", test_name).bold()));
        out.push_str(&format!(
            "   Attempt: {} | Questions: {}\n\n",
            result.attempt_id, result.total_marks
        ));

        out.push_str(&format!(
            "   Score: {} {}\n",
            self.create_score_bar(result.score_percentage),
            self.colorize_band(result.band)
        ));
        out.push_str(&format!(
            "   {:.2} / {} marks, accuracy {:.1}%\n",
            result.total_score,
            result.total_marks,
            result.accuracy * 100.0
        ));
        out.push_str(&format!("   {}\n\n", result.band.feedback().dimmed()));

        out.push_str(&format!(
            "   Correct {} | Incorrect {} | Unattempted {} | Avg time {}s\n\n",
            result.correct_count.to_string().green(),
            result.incorrect_count.to_string().red(),
            result.unattempted_count.to_string().dimmed(),
            result.avg_time_per_question_secs
        ));

        if !result.subject_breakdown.is_empty() {
            out.push_str(&format!("   {}\n", "Subjects:".bold()));
            for (subject, score) in &result.subject_breakdown {
                let bar = self.create_mini_bar(score.correct, score.attempted);
                let score_str = format!("{:>2}/{:<2}", score.correct, score.attempted);
                out.push_str(&format!(
                    "   {} {} {} ({} questions)\n",
                    bar,
                    self.colorize_ratio(&score_str, score.accuracy()),
                    subject,
                    score.total
                ));
            }
            out.push('\n');
        }

        if !result.weak_subjects.is_empty() {
            out.push_str(&format!("   {}\n", "Focus on:".bold()));
            for subject in &result.weak_subjects {
                out.push_str(&format!("   {} {}\n", "→".cyan(), subject));
            }
            out.push('\n');
        }

        if self.verbose {
            out.push_str(&format!("   {}\n", "Questions:".bold()));
            for (i, q) in result.questions.iter().enumerate() {
                let icon = match q.verdict {
                    crate::scoring::Verdict::Correct => "✓".green(),
                    crate::scoring::Verdict::Incorrect => "✗".red(),
                    crate::scoring::Verdict::Unattempted => "-".dimmed(),
                };
                out.push_str(&format!(
                    "   {} Q{:<3} {} {}s\n",
                    icon,
                    i + 1,
                    q.subject.dimmed(),
                    q.time_spent_secs
                ));
            }
            out.push('\n');
        }
        out
    }

    pub fn render_dashboard(&self, dashboard: &Dashboard) -> String {
        let mut out = String::new();
        out.push('\n');
        out.push_str(&format!(
            "{}\n",
            format!("Performance Analytics ({})", dashboard.today).bold()
        ));
        out.push_str(&format!(
            "   Completed tests: {}\n\n",
            dashboard.completed_attempts.to_string().bold()
        ));

        let accuracy = &dashboard.accuracy;
        out.push_str(&format!(
            "   Overall accuracy: {}\n\n",
            self.colorize_ratio(&format!("{:.1}%", accuracy.ratio * 100.0), accuracy.ratio)
        ));

        out.push_str(&format!("   {}\n", "Score trend:".bold()));
        match &dashboard.trend {
            AccuracyTrend::InsufficientData { .. } => {
                out.push_str(&format!(
                    "   {}\n",
                    "Complete at least two tests to see a trend".dimmed()
                ));
            }
            AccuracyTrend::Available { points, average } => {
                for point in points {
                    out.push_str(&format!(
                        "   {} {}\n",
                        point.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                        self.create_score_bar(point.score)
                    ));
                }
                out.push_str(&format!("   Average: {:.1}%\n", average));
            }
        }
        out.push('\n');

        out.push_str(&format!("   {}\n", "Engagement:".bold()));
        if dashboard.engagement.is_empty() {
            out.push_str(&format!("   {}\n", "No engagement data".dimmed()));
        }
        for bucket in &dashboard.engagement {
            out.push_str(&format!(
                "   {} {} {}\n",
                bucket.day,
                "■".repeat(bucket.attempts.min(30)),
                bucket.attempts
            ));
        }
        out.push('\n');

        let dist = &dashboard.distribution;
        out.push_str(&format!("   {}\n", "Score distribution:".bold()));
        for (label, count) in BUCKET_LABELS.iter().zip(dist.buckets) {
            out.push_str(&format!("   {:>8} {}\n", label, count));
        }
        if !dist.is_empty() {
            out.push_str(&format!(
                "   min {:.1}% | max {:.1}% | mean {:.1}%\n",
                dist.min, dist.max, dist.mean
            ));
        }
        out.push('\n');

        let streak = &dashboard.streak;
        out.push_str(&format!("   {}\n", "Streak:".bold()));
        out.push_str(&format!(
            "   Current {} | Longest {} | Practice days {}\n",
            self.streak_badge(streak.current_streak),
            streak.longest_streak,
            streak.total_practice_days
        ));
        let week: Vec<String> = WEEKDAYS
            .iter()
            .zip(streak.weekly.days)
            .enumerate()
            .map(|(i, (name, practiced))| {
                let cell = if practiced {
                    name.green().to_string()
                } else {
                    name.dimmed().to_string()
                };
                if i == streak.weekly.today_index {
                    format!("[{}]", cell)
                } else {
                    cell
                }
            })
            .collect();
        out.push_str(&format!("   {}\n", week.join(" ")));
        out.push_str(&format!("   {}\n\n", streak.message.italic()));

        let milestones = &dashboard.milestones;
        let marks: Vec<String> = milestones
            .milestones
            .iter()
            .map(|m| {
                if m.achieved {
                    m.value.to_string().green().to_string()
                } else {
                    m.value.to_string().dimmed().to_string()
                }
            })
            .collect();
        out.push_str(&format!(
            "   Milestones: {} (next: {})\n",
            marks.join(" "),
            milestones.next
        ));

        if !dashboard.subjects.is_empty() {
            out.push('\n');
            out.push_str(&format!("   {}\n", "Subjects:".bold()));
            for subject in &dashboard.subjects {
                out.push_str(&format!(
                    "   {} {}/{} {}\n",
                    self.colorize_ratio(&format!("{:>5.1}%", subject.accuracy * 100.0), subject.accuracy),
                    subject.correct,
                    subject.attempted,
                    subject.subject
                ));
            }
        }
        out.push('\n');
        out
    }

    pub fn render_batch(&self, batch: &BatchOutcome) -> String {
        let mut out = String::new();
        for (attempt_id, result) in &batch.results {
            out.push_str(&format!(
                "{} {} {} {}\n",
                self.create_score_bar(result.score_percentage),
                self.colorize_band(result.band),
                attempt_id.bold(),
                format!("({}/{} correct)", result.correct_count, result.total_marks).dimmed()
            ));
        }
        for failure in &batch.failures {
            out.push_str(&format!(
                "{} {}: {}\n",
                "✗".red(),
                failure.attempt_id,
                failure.reason
            ));
        }
        out.push_str(&format!(
            "\n   Scored {} attempt(s), {} failed\n",
            batch.results.len(),
            batch.failures.len()
        ));
        out
    }

    pub fn render_history(&self, entries: &[HistoryEntry]) -> String {
        if entries.is_empty() {
            return format!("{}\n", "No completed tests yet".dimmed());
        }
        let mut out = String::new();
        for entry in entries {
            out.push_str(&format!(
                "{} {} {} {} ({} questions)\n",
                entry.started_at.format("%Y-%m-%d").to_string().dimmed(),
                self.colorize_ratio(&format!("{:>6.1}%", entry.score), entry.score / 100.0),
                entry.display_name.bold(),
                format!("[{}]", entry.attempt_id).dimmed(),
                entry.total_questions
            ));
        }
        out
    }

    pub fn render_import(&self, report: &ImportReport) -> String {
        let mut out = String::new();
        for test in &report.tests {
            out.push_str(&format!(
                "{} {} ({} questions, {} min) [{}]\n",
                "✓".green(),
                test.name.bold(),
                test.questions.len(),
                test.time_limit_minutes,
                test.id.dimmed()
            ));
        }
        for failure in &report.failures {
            out.push_str(&format!(
                "{} {}: {}\n",
                "✗".red(),
                failure.path.display(),
                failure.reason
            ));
        }
        out
    }

    fn colorize_band(&self, band: PerformanceBand) -> colored::ColoredString {
        let s = band.to_string();
        match band {
            PerformanceBand::Excellent => s.green().bold(),
            PerformanceBand::Good => s.green(),
            PerformanceBand::Progress => s.yellow(),
            PerformanceBand::NeedsImprovement => s.red(),
        }
    }

    fn colorize_ratio(&self, text: &str, ratio: f64) -> colored::ColoredString {
        if ratio >= 0.7 {
            text.green()
        } else if ratio >= 0.4 {
            text.yellow()
        } else {
            text.red()
        }
    }

    fn create_score_bar(&self, percentage: f64) -> String {
        let clamped = percentage.clamp(0.0, 100.0);
        let filled = ((clamped * 20.0) / 100.0).round() as usize;
        let empty = 20 - filled;

        let bar = format!(
            "[{}{}] {:>6.1}%",
            "█".repeat(filled),
            "░".repeat(empty),
            percentage
        );

        if self.use_colors {
            if percentage >= 80.0 {
                bar.green().to_string()
            } else if percentage >= 60.0 {
                bar.yellow().to_string()
            } else {
                bar.red().to_string()
            }
        } else {
            bar
        }
    }

    fn streak_badge(&self, current_streak: u32) -> String {
        let count = current_streak.to_string().bold();
        if !self.pulsating_badge || current_streak == 0 {
            return count.to_string();
        }
        let dot = if self.use_colors {
            "●".yellow().blink().to_string()
        } else {
            "●".to_string()
        };
        format!("{} {}", dot, count)
    }

    fn create_mini_bar(&self, value: usize, max: usize) -> String {
        let filled = if max == 0 { 0 } else { (value * 10) / max };
        let empty = 10 - filled;
        format!("[{}{}]", "▓".repeat(filled), "░".repeat(empty))
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
