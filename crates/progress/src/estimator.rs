//! Points and remaining-time estimation for a pathway.

use eduhub_core::{CourseId, CourseState, Pathway, ProgressMap};
use serde::Serialize;

use crate::engine::ProgressionEngine;

/// Effort figures of a pathway for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayEstimate {
    /// Points earned across the pathway's courses
    pub points_earned: u32,

    /// Sum of the stages' estimated weeks
    pub estimated_weeks_total: u32,

    /// Weeks still ahead
    pub estimated_weeks_remaining: u32,

    /// Stage to work on next, if any
    pub next_stage: Option<CourseId>,
}

/// Completion time estimator.
pub struct CompletionEstimator;

impl CompletionEstimator {
    /// Estimate effort for one user's progress through a pathway.
    pub fn estimate(&self, pathway: &Pathway, progress: &ProgressMap) -> PathwayEstimate {
        let engine = ProgressionEngine::new(pathway, progress);
        let mut estimate = PathwayEstimate::default();
        let mut first_not_started = None;

        for course in pathway.courses() {
            let stage_weeks = course
                .stage
                .as_ref()
                .and_then(|s| s.estimated_weeks)
                .unwrap_or(0);
            estimate.estimated_weeks_total += stage_weeks;

            let record = progress.get(&course.id);
            if let Some(record) = record {
                estimate.points_earned = estimate.points_earned.saturating_add(record.points_earned);
            }

            match engine.state_of(course) {
                CourseState::Completed => {}
                CourseState::InProgress => {
                    // Prefer the course's own week counters when reported
                    let remaining = match record {
                        Some(r) if r.total_weeks > 0 => r.total_weeks.saturating_sub(r.current_week),
                        _ => stage_weeks,
                    };
                    estimate.estimated_weeks_remaining += remaining;
                    if estimate.next_stage.is_none() {
                        estimate.next_stage = Some(course.id.clone());
                    }
                }
                CourseState::NotStarted => {
                    estimate.estimated_weeks_remaining += stage_weeks;
                    if first_not_started.is_none() {
                        first_not_started = Some(course.id.clone());
                    }
                }
                CourseState::Locked => estimate.estimated_weeks_remaining += stage_weeks,
            }
        }

        if estimate.next_stage.is_none() {
            estimate.next_stage = first_not_started;
        }
        estimate
    }
}

impl Default for CompletionEstimator {
    fn default() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eduhub_core::{Course, ProgressEvent, UserCourseProgress};

    fn id(s: &str) -> CourseId {
        s.parse().unwrap()
    }

    fn stage(key: &str, order: u32, weeks: u32, prereqs: &[&str]) -> Course {
        let mut course = Course::new(id(key), key).with_stage("P", key, order);
        if let Some(stage) = course.stage.as_mut() {
            stage.estimated_weeks = Some(weeks);
        }
        for p in prereqs {
            course = course.with_prerequisite(id(p));
        }
        course
    }

    fn pathway() -> Pathway {
        Pathway::new(
            "P",
            vec![
                stage("a", 0, 2, &[]),
                stage("b", 1, 4, &["a"]),
                stage("c", 2, 6, &["b"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_fresh_pathway() {
        let estimate = CompletionEstimator.estimate(&pathway(), &ProgressMap::new());
        assert_eq!(estimate.estimated_weeks_total, 12);
        assert_eq!(estimate.estimated_weeks_remaining, 12);
        assert_eq!(estimate.points_earned, 0);
        assert_eq!(estimate.next_stage, Some(id("a")));
    }

    #[test]
    fn test_partial_progress() {
        let user = "u".parse().unwrap();
        let mut a = UserCourseProgress::enroll(user, id("a"), 2);
        a.apply(ProgressEvent::Completed { at: Utc::now(), points_earned: 50 }).unwrap();
        let mut b = UserCourseProgress::enroll(a.user_id.clone(), id("b"), 4);
        b.apply(ProgressEvent::Advanced { percentage: 25, current_week: Some(1) }).unwrap();
        b.points_earned = 10;

        let progress: ProgressMap = [a, b].into_iter().map(|p| (p.course_id.clone(), p)).collect();
        let estimate = CompletionEstimator::default().estimate(&pathway(), &progress);

        assert_eq!(estimate.points_earned, 60);
        // b has 3 weeks left, c is locked with 6
        assert_eq!(estimate.estimated_weeks_remaining, 9);
        assert_eq!(estimate.next_stage, Some(id("b")));
    }

    #[test]
    fn test_empty_pathway() {
        let estimate = CompletionEstimator.estimate(&Pathway::empty("P"), &ProgressMap::new());
        assert_eq!(estimate, PathwayEstimate::default());
    }
}
