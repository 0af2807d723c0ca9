//! Pathway progression engine.
//!
//! Classifies every course of a pathway into a [`CourseState`] for one user
//! and derives the pathway aggregates. Everything here is pure: the engine
//! borrows an already-fetched snapshot and never mutates it.

use eduhub_core::{
    ButtonAction, Course, CourseId, CourseState, Pathway, PathwayStats, ProgressMap,
    UserCourseProgress,
};
use serde::Serialize;
use tracing::trace;

/// Fallback when the first prerequisite is not a stage of the pathway.
pub const GENERIC_UNLOCK_MESSAGE: &str = "Complete previous stage to unlock";

/// Progression rules evaluated over a snapshot of one user's progress.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionEngine<'a> {
    pathway: &'a Pathway,
    progress: &'a ProgressMap,
}

impl<'a> ProgressionEngine<'a> {
    /// Create an engine over a pathway and the user's progress in it.
    pub fn new(pathway: &'a Pathway, progress: &'a ProgressMap) -> Self {
        Self { pathway, progress }
    }

    /// The pathway being evaluated.
    pub fn pathway(&self) -> &'a Pathway {
        self.pathway
    }

    /// Resolve the display state of `course` given its own progress record.
    ///
    /// A progress record always wins. Without one, the course is locked if
    /// any prerequisite is not completed; a prerequisite outside the
    /// pathway counts as not completed.
    pub fn resolve_course_state(
        &self,
        course: &Course,
        progress: Option<&UserCourseProgress>,
    ) -> CourseState {
        if let Some(progress) = progress {
            return progress.status.into();
        }

        if let Some(unmet) = course
            .prerequisites
            .iter()
            .find(|id| !self.prerequisite_met(id))
        {
            trace!(course = %course.id, prerequisite = %unmet, "course locked");
            return CourseState::Locked;
        }

        CourseState::NotStarted
    }

    /// Resolve the state of `course` using the snapshot's own record for it.
    pub fn state_of(&self, course: &Course) -> CourseState {
        self.resolve_course_state(course, self.progress.get(&course.id))
    }

    /// Whether a prerequisite is a completed stage of this pathway.
    pub fn prerequisite_met(&self, id: &CourseId) -> bool {
        if !self.pathway.contains(id) {
            trace!(prerequisite = %id, pathway = self.pathway.name(), "prerequisite outside pathway");
            return false;
        }
        self.progress.get(id).is_some_and(UserCourseProgress::is_completed)
    }

    /// Tally course states into pathway aggregates.
    pub fn compute_stats(&self) -> PathwayStats {
        let mut stats = PathwayStats::default();

        for course in self.pathway.courses() {
            match self.state_of(course) {
                CourseState::Completed => stats.completed_courses += 1,
                CourseState::InProgress => stats.active_courses += 1,
                CourseState::Locked => stats.locked_courses += 1,
                CourseState::NotStarted => {}
            }
        }

        stats.overall_progress = rounded_percentage(stats.completed_courses, self.pathway.total_stages());
        stats
    }

    /// Build the display row of one course.
    pub fn course_view(&self, course: &Course) -> CourseView {
        let state = self.state_of(course);
        let action = button_action(state);
        let unlock_message = match state {
            CourseState::Locked => unlock_message(course, self.pathway),
            _ => None,
        };

        CourseView {
            course_id: course.id.clone(),
            title: course.title.clone(),
            stage_title: course.stage_title().map(str::to_string),
            order: course.order(),
            state,
            button_label: action.label,
            button_enabled: action.enabled,
            unlock_message,
            completion_percentage: self
                .progress
                .get(&course.id)
                .map(|p| p.completion_percentage),
        }
    }

    /// Build the full pathway view.
    pub fn overview(&self) -> PathwayOverview {
        PathwayOverview {
            name: self.pathway.name().to_string(),
            total_stages: self.pathway.total_stages(),
            courses: self
                .pathway
                .courses()
                .iter()
                .map(|c| self.course_view(c))
                .collect(),
            stats: self.compute_stats(),
        }
    }
}

/// Compute pathway aggregates for one user's progress.
pub fn compute_pathway_stats(pathway: &Pathway, progress: &ProgressMap) -> PathwayStats {
    ProgressionEngine::new(pathway, progress).compute_stats()
}

/// Message explaining how to unlock `course`, or `None` if it has no
/// prerequisites.
///
/// Only the first prerequisite is named.
pub fn unlock_message(course: &Course, pathway: &Pathway) -> Option<String> {
    let first = course.prerequisites.first()?;

    let message = match pathway.course(first).and_then(Course::stage_title) {
        Some(title) => format!("Complete {title} to unlock"),
        None => GENERIC_UNLOCK_MESSAGE.to_string(),
    };
    Some(message)
}

/// Call-to-action for a course state.
pub fn button_action(state: CourseState) -> ButtonAction {
    match state {
        CourseState::Locked => ButtonAction { label: "Not available yet", enabled: false },
        CourseState::NotStarted => ButtonAction { label: "Start Course", enabled: true },
        CourseState::InProgress => ButtonAction { label: "Continue Learning", enabled: true },
        CourseState::Completed => ButtonAction { label: "Review Course", enabled: true },
    }
}

/// round(100 * part / total), 0 when total is 0.
fn rounded_percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (part.min(total) * 200 + total) / (2 * total);
    pct as u8
}

/// Display row of a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    /// Course id
    pub course_id: CourseId,
    /// Course title
    pub title: String,
    /// Stage title within the pathway
    pub stage_title: Option<String>,
    /// Stage order
    pub order: Option<u32>,
    /// Resolved state
    pub state: CourseState,
    /// Button label
    pub button_label: &'static str,
    /// Whether the button is enabled
    pub button_enabled: bool,
    /// How to unlock, only while locked
    pub unlock_message: Option<String>,
    /// Reported completion, if the user has a record
    pub completion_percentage: Option<u8>,
}

/// Display data of a whole pathway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayOverview {
    /// Pathway name
    pub name: String,
    /// Number of stages
    pub total_stages: usize,
    /// Course rows in stage order
    pub courses: Vec<CourseView>,
    /// Aggregates
    pub stats: PathwayStats,
}
