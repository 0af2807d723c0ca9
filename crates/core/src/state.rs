//! Display state of a course and the derived pathway aggregates.

use serde::{Deserialize, Serialize};

use crate::progress::ProgressStatus;

/// Display state of a course for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseState {
    /// A prerequisite is not completed yet
    Locked,
    /// Available but not started
    NotStarted,
    /// Started and not finished
    InProgress,
    /// Finished
    Completed,
}

impl CourseState {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseState::Locked => "locked",
            CourseState::NotStarted => "not-started",
            CourseState::InProgress => "in-progress",
            CourseState::Completed => "completed",
        }
    }
}

impl From<ProgressStatus> for CourseState {
    fn from(status: ProgressStatus) -> Self {
        match status {
            ProgressStatus::NotStarted => CourseState::NotStarted,
            ProgressStatus::InProgress => CourseState::InProgress,
            ProgressStatus::Completed => CourseState::Completed,
        }
    }
}

impl std::fmt::Display for CourseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call-to-action shown for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonAction {
    /// Button label
    pub label: &'static str,

    /// Whether the button can be pressed
    pub enabled: bool,
}

/// Aggregates of a pathway for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayStats {
    /// Completed courses
    pub completed_courses: usize,

    /// Courses in progress
    pub active_courses: usize,

    /// Locked courses
    pub locked_courses: usize,

    /// Rounded share of completed stages (0-100)
    pub overall_progress: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_status() {
        assert_eq!(CourseState::from(ProgressStatus::NotStarted), CourseState::NotStarted);
        assert_eq!(CourseState::from(ProgressStatus::InProgress), CourseState::InProgress);
        assert_eq!(CourseState::from(ProgressStatus::Completed), CourseState::Completed);
    }

    #[test]
    fn test_state_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&CourseState::NotStarted).unwrap(), "\"not-started\"");
        assert_eq!(CourseState::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn test_stats_default_is_zero() {
        let stats = PathwayStats::default();
        assert_eq!(stats.completed_courses, 0);
        assert_eq!(stats.overall_progress, 0);
    }
}
