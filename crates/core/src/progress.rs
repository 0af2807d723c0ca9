//! Per-user course progress and its lifecycle events.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ModelError;
use crate::id::{CourseId, UserId};
use crate::Time;

/// Progress records of one user, keyed by course.
pub type ProgressMap = HashMap<CourseId, UserCourseProgress>;

/// Reported status of a (user, course) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    /// Enrolled, nothing done yet
    NotStarted,
    /// Partway through
    InProgress,
    /// Finished
    Completed,
}

impl ProgressStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not-started",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

/// Progress of a user through one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProgressRecord")]
pub struct UserCourseProgress {
    /// Enrolled user
    pub user_id: UserId,

    /// Course being followed
    pub course_id: CourseId,

    /// Reported status
    pub status: ProgressStatus,

    /// Completion percentage (0-100). Not forced to 100 for completed courses.
    pub completion_percentage: u8,

    /// Current week of the course
    pub current_week: u32,

    /// Total weeks of the course
    pub total_weeks: u32,

    /// Completion time, only set while completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Time>,

    /// Points earned so far
    pub points_earned: u32,
}

/// Raw progress payload as reported upstream, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRecord {
    user_id: UserId,
    course_id: CourseId,
    status: ProgressStatus,
    #[serde(default)]
    completion_percentage: u32,
    #[serde(default)]
    current_week: u32,
    #[serde(default)]
    total_weeks: u32,
    #[serde(default)]
    completed_at: Option<Time>,
    #[serde(default)]
    points_earned: u32,
}

impl TryFrom<ProgressRecord> for UserCourseProgress {
    type Error = ModelError;

    fn try_from(raw: ProgressRecord) -> Result<Self, Self::Error> {
        let completion_percentage = u8::try_from(raw.completion_percentage)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(ModelError::PercentageOutOfRange(raw.completion_percentage))?;

        let completed_at = match (raw.status, raw.completed_at) {
            (ProgressStatus::Completed, at) => at,
            (status, Some(_)) => {
                warn!(
                    user = %raw.user_id,
                    course = %raw.course_id,
                    status = status.as_str(),
                    "dropping completedAt on a course that is not completed"
                );
                None
            }
            (_, None) => None,
        };

        Ok(Self {
            user_id: raw.user_id,
            course_id: raw.course_id,
            status: raw.status,
            completion_percentage,
            current_week: raw.current_week,
            total_weeks: raw.total_weeks,
            completed_at,
            points_earned: raw.points_earned,
        })
    }
}

/// Progress-reporting events from the enrollment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// The learner opened the course for the first time
    Started,

    /// The learner advanced through the course
    Advanced {
        /// New completion percentage
        percentage: u8,
        /// New current week, if reported
        current_week: Option<u32>,
    },

    /// The learner finished the course
    Completed {
        /// When it was finished
        at: Time,
        /// Points awarded for completion
        points_earned: u32,
    },
}

impl UserCourseProgress {
    /// Create the record written on first enrollment.
    pub fn enroll(user_id: UserId, course_id: CourseId, total_weeks: u32) -> Self {
        Self {
            user_id,
            course_id,
            status: ProgressStatus::NotStarted,
            completion_percentage: 0,
            current_week: 0,
            total_weeks,
            completed_at: None,
            points_earned: 0,
        }
    }

    /// Whether the course is completed.
    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }

    /// Apply a progress event. Completed records ignore further events.
    pub fn apply(&mut self, event: ProgressEvent) -> Result<(), ModelError> {
        match event {
            ProgressEvent::Started => {
                if self.status == ProgressStatus::NotStarted {
                    self.status = ProgressStatus::InProgress;
                    self.current_week = self.current_week.max(1);
                }
            }
            ProgressEvent::Advanced { percentage, current_week } => {
                if percentage > 100 {
                    return Err(ModelError::PercentageOutOfRange(percentage.into()));
                }
                if self.is_completed() {
                    return Ok(());
                }
                self.status = ProgressStatus::InProgress;
                self.completion_percentage = percentage;
                if let Some(week) = current_week {
                    self.current_week = week;
                }
            }
            ProgressEvent::Completed { at, points_earned } => {
                if self.is_completed() {
                    return Ok(());
                }
                self.status = ProgressStatus::Completed;
                self.completion_percentage = 100;
                self.current_week = self.total_weeks.max(self.current_week);
                self.completed_at = Some(at);
                self.points_earned = self.points_earned.saturating_add(points_earned);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> UserCourseProgress {
        UserCourseProgress::enroll("u1".parse().unwrap(), "c1".parse().unwrap(), 6)
    }

    #[test]
    fn test_enroll_starts_not_started() {
        let progress = record();
        assert_eq!(progress.status, ProgressStatus::NotStarted);
        assert_eq!(progress.completion_percentage, 0);
        assert!(progress.completed_at.is_none());
    }

    #[test]
    fn test_lifecycle_events() {
        let mut progress = record();
        progress.apply(ProgressEvent::Started).unwrap();
        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert_eq!(progress.current_week, 1);

        progress
            .apply(ProgressEvent::Advanced { percentage: 40, current_week: Some(3) })
            .unwrap();
        assert_eq!(progress.completion_percentage, 40);
        assert_eq!(progress.current_week, 3);

        let at = Utc::now();
        progress
            .apply(ProgressEvent::Completed { at, points_earned: 150 })
            .unwrap();
        assert!(progress.is_completed());
        assert_eq!(progress.completed_at, Some(at));
        assert_eq!(progress.points_earned, 150);
        assert_eq!(progress.current_week, 6);

        // Further progress does not reopen a completed course
        progress
            .apply(ProgressEvent::Advanced { percentage: 10, current_week: None })
            .unwrap();
        assert!(progress.is_completed());
        assert_eq!(progress.completion_percentage, 100);
    }

    #[test]
    fn test_completing_twice_keeps_first_completion() {
        let mut progress = record();
        let first = Utc::now();
        progress
            .apply(ProgressEvent::Completed { at: first, points_earned: 100 })
            .unwrap();

        let later = first + chrono::Duration::days(1);
        progress
            .apply(ProgressEvent::Completed { at: later, points_earned: 100 })
            .unwrap();
        assert_eq!(progress.points_earned, 100);
        assert_eq!(progress.completed_at, Some(first));
    }

    #[test]
    fn test_advanced_rejects_out_of_range() {
        let mut progress = record();
        let err = progress
            .apply(ProgressEvent::Advanced { percentage: 101, current_week: None })
            .unwrap_err();
        assert_eq!(err, ModelError::PercentageOutOfRange(101));
        assert_eq!(progress.status, ProgressStatus::NotStarted);
    }

    #[test]
    fn test_parse_passes_through_partial_completion() {
        let json = r#"{
            "userId": "u1", "courseId": "c1", "status": "completed",
            "completionPercentage": 85, "currentWeek": 4, "totalWeeks": 4,
            "completedAt": "2024-05-01T10:00:00Z", "pointsEarned": 120
        }"#;
        let progress: UserCourseProgress = serde_json::from_str(json).unwrap();
        assert!(progress.is_completed());
        assert_eq!(progress.completion_percentage, 85);
        assert!(progress.completed_at.is_some());
    }

    #[test]
    fn test_parse_rejects_bad_percentage() {
        let json = r#"{"userId": "u1", "courseId": "c1", "status": "in-progress", "completionPercentage": 250}"#;
        assert!(serde_json::from_str::<UserCourseProgress>(json).is_err());
    }

    #[test]
    fn test_parse_drops_completed_at_when_not_completed() {
        let json = r#"{
            "userId": "u1", "courseId": "c1", "status": "in-progress",
            "completionPercentage": 30, "completedAt": "2024-05-01T10:00:00Z"
        }"#;
        let progress: UserCourseProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert!(progress.completed_at.is_none());
    }

    #[test]
    fn test_serialize_round_trips_through_validation() {
        let progress = record();
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"status\":\"not-started\""));
        let back: UserCourseProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }
}
