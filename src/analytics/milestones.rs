//! Attempt-count milestones

use serde::{Serialize, Serializer};

pub const DEFAULT_MILESTONES: [u32; 6] = [1, 5, 10, 20, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus {
    pub value: u32,
    pub achieved: bool,
}

/// The next milestone to reach, or `Max` once all are achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextMilestone {
    Value(u32),
    Max,
}

impl std::fmt::Display for NextMilestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextMilestone::Value(v) => write!(f, "{}", v),
            NextMilestone::Max => write!(f, "Max"),
        }
    }
}

impl Serialize for NextMilestone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NextMilestone::Value(v) => serializer.serialize_u32(*v),
            NextMilestone::Max => serializer.serialize_str("Max"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneProgress {
    pub attempt_count: u32,
    pub milestones: Vec<MilestoneStatus>,
    pub next: NextMilestone,
}

impl MilestoneProgress {
    pub fn achieved(&self) -> impl Iterator<Item = u32> + '_ {
        self.milestones.iter().filter(|m| m.achieved).map(|m| m.value)
    }
}

pub fn milestone_progress(attempt_count: u32, milestones: &[u32]) -> MilestoneProgress {
    let mut sorted = milestones.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let next = sorted
        .iter()
        .copied()
        .find(|&m| m > attempt_count)
        .map(NextMilestone::Value)
        .unwrap_or(NextMilestone::Max);

    MilestoneProgress {
        attempt_count,
        milestones: sorted
            .into_iter()
            .map(|value| MilestoneStatus {
                value,
                achieved: attempt_count >= value,
            })
            .collect(),
        next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_attempts_reach_first_two() {
        let progress = milestone_progress(7, &DEFAULT_MILESTONES);
        assert_eq!(progress.achieved().collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(progress.next, NextMilestone::Value(10));
    }

    #[test]
    fn hitting_a_milestone_exactly_counts_as_achieved() {
        let progress = milestone_progress(10, &DEFAULT_MILESTONES);
        assert_eq!(progress.achieved().collect::<Vec<_>>(), vec![1, 5, 10]);
        assert_eq!(progress.next, NextMilestone::Value(20));
    }

    #[test]
    fn zero_attempts_achieve_nothing() {
        let progress = milestone_progress(0, &DEFAULT_MILESTONES);
        assert_eq!(progress.achieved().count(), 0);
        assert_eq!(progress.next, NextMilestone::Value(1));
    }

    #[test]
    fn all_achieved_reports_max() {
        let progress = milestone_progress(250, &DEFAULT_MILESTONES);
        assert_eq!(progress.achieved().count(), 6);
        assert_eq!(progress.next, NextMilestone::Max);
        assert_eq!(progress.next.to_string(), "Max");
        assert_eq!(serde_json::to_string(&progress.next).unwrap(), "\"Max\"");
    }

    #[test]
    fn empty_milestone_set_is_max() {
        let progress = milestone_progress(3, &[]);
        assert!(progress.milestones.is_empty());
        assert_eq!(progress.next, NextMilestone::Max);
    }
}
