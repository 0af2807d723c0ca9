//! Pathway service: fetches snapshots from storage and runs the engine.

use eduhub_core::{
    CourseId, CourseState, ModelError, Pathway, ProgressEvent, ProgressMap, UserCourseProgress,
    UserSession,
};
use eduhub_storage::{Catalog, EnrollmentStore, StorageError};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{unlock_message, PathwayOverview, ProgressionEngine, GENERIC_UNLOCK_MESSAGE};
use crate::estimator::{CompletionEstimator, PathwayEstimate};
use crate::prerequisite::{PrerequisiteAnalyzer, PrerequisiteReport};

/// Result alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced to callers of the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid progress update
    #[error(transparent)]
    Model(#[from] ModelError),

    /// No course is staged in the pathway
    #[error("Pathway not found: {0}")]
    PathwayNotFound(String),

    /// Unknown course
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    /// The user has no progress record for the course
    #[error("Not enrolled in course {0}")]
    NotEnrolled(CourseId),

    /// The course's prerequisites are not completed
    #[error("Course {course} is locked: {reason}")]
    Locked {
        /// Locked course
        course: CourseId,
        /// Unlock message
        reason: String,
    },
}

/// Analysis of a pathway for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayReport {
    /// Pathway name
    pub name: String,
    /// Prerequisite findings
    pub prerequisites: PrerequisiteReport,
    /// Effort estimate
    pub estimate: PathwayEstimate,
}

/// One enrolled course on a user's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEntry {
    /// Course id
    pub course_id: CourseId,
    /// Course title, when the catalog still knows the course
    pub title: Option<String>,
    /// Pathway the course is staged in
    pub pathway: Option<String>,
    /// Current state
    pub state: CourseState,
    /// Reported completion
    pub completion_percentage: u8,
    /// Points earned
    pub points_earned: u32,
}

/// Serves pathway views on top of a catalog and an enrollment store.
///
/// The signed-in user is always passed in explicitly.
pub struct PathwayService<S> {
    storage: S,
}

impl<S: Catalog + EnrollmentStore> PathwayService<S> {
    /// Create a service over a storage backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Access the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the storage backend.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Load a pathway with the session user's progress in it.
    ///
    /// Anonymous callers get an empty progress map.
    async fn snapshot(
        &self,
        session: Option<&UserSession>,
        name: &str,
    ) -> Result<(Pathway, ProgressMap)> {
        let pathway = self.storage.load_pathway(name).await?;
        if pathway.is_empty() {
            return Err(ServiceError::PathwayNotFound(name.to_string()));
        }

        let progress = match session {
            Some(session) => {
                self.storage
                    .progress_for(&session.user_id, &pathway.course_ids())
                    .await?
            }
            None => ProgressMap::new(),
        };

        debug!(
            pathway = name,
            stages = pathway.total_stages(),
            records = progress.len(),
            "loaded pathway snapshot"
        );
        Ok((pathway, progress))
    }

    /// Pathway view for the session user.
    pub async fn overview(
        &self,
        session: Option<&UserSession>,
        name: &str,
    ) -> Result<PathwayOverview> {
        let (pathway, progress) = self.snapshot(session, name).await?;
        Ok(ProgressionEngine::new(&pathway, &progress).overview())
    }

    /// Prerequisite analysis and effort estimate for the session user.
    pub async fn analyze(&self, session: Option<&UserSession>, name: &str) -> Result<PathwayReport> {
        let (pathway, progress) = self.snapshot(session, name).await?;
        Ok(PathwayReport {
            name: pathway.name().to_string(),
            prerequisites: PrerequisiteAnalyzer::new(&pathway).analyze(&progress),
            estimate: CompletionEstimator.estimate(&pathway, &progress),
        })
    }

    /// Enroll the session user in a course.
    ///
    /// Enrolling twice returns the existing record. A locked course cannot
    /// be enrolled in.
    pub async fn enroll(
        &mut self,
        session: &UserSession,
        course_id: &CourseId,
    ) -> Result<UserCourseProgress> {
        if let Some(existing) = self.storage.load_progress(&session.user_id, course_id).await? {
            return Ok(existing);
        }

        let course = self
            .storage
            .load_course(course_id)
            .await?
            .ok_or_else(|| ServiceError::CourseNotFound(course_id.clone()))?;

        if let Some(name) = course.pathway() {
            let (pathway, progress) = self.snapshot(Some(session), name).await?;
            let engine = ProgressionEngine::new(&pathway, &progress);
            if engine.state_of(&course) == CourseState::Locked {
                let reason = unlock_message(&course, &pathway)
                    .unwrap_or_else(|| GENERIC_UNLOCK_MESSAGE.to_string());
                return Err(ServiceError::Locked {
                    course: course.id,
                    reason,
                });
            }
        } else if course.has_prerequisites() {
            // Outside any pathway nothing can satisfy a prerequisite
            return Err(ServiceError::Locked {
                course: course.id,
                reason: GENERIC_UNLOCK_MESSAGE.to_string(),
            });
        }

        let total_weeks = course
            .stage
            .as_ref()
            .and_then(|s| s.estimated_weeks)
            .unwrap_or(0);
        let progress = UserCourseProgress::enroll(session.user_id.clone(), course.id, total_weeks);
        self.storage.save_progress(&progress).await?;

        info!(user = %progress.user_id, course = %progress.course_id, "enrolled");
        Ok(progress)
    }

    /// Apply a progress event to the session user's record of a course.
    pub async fn report(
        &mut self,
        session: &UserSession,
        course_id: &CourseId,
        event: ProgressEvent,
    ) -> Result<UserCourseProgress> {
        let mut progress = self
            .storage
            .load_progress(&session.user_id, course_id)
            .await?
            .ok_or_else(|| ServiceError::NotEnrolled(course_id.clone()))?;

        progress.apply(event)?;
        self.storage.save_progress(&progress).await?;

        info!(
            user = %progress.user_id,
            course = %progress.course_id,
            status = progress.status.as_str(),
            percentage = progress.completion_percentage,
            "progress recorded"
        );
        Ok(progress)
    }

    /// The session user's enrolled courses.
    pub async fn dashboard(&self, session: &UserSession) -> Result<Vec<DashboardEntry>> {
        let records = self.storage.list_progress(&session.user_id).await?;
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            let course = self.storage.load_course(&record.course_id).await?;
            entries.push(DashboardEntry {
                title: course.as_ref().map(|c| c.title.clone()),
                pathway: course.as_ref().and_then(|c| c.pathway().map(str::to_string)),
                state: record.status.into(),
                completion_percentage: record.completion_percentage,
                points_earned: record.points_earned,
                course_id: record.course_id,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eduhub_core::{Course, ProgressStatus, UserId};
    use eduhub_storage::MemoryStorage;

    fn id(s: &str) -> CourseId {
        s.parse().unwrap()
    }

    fn session() -> UserSession {
        let user: UserId = "student-1".parse().unwrap();
        UserSession::student(user, "Sam")
    }

    fn catalog() -> MemoryStorage {
        MemoryStorage::with_courses(vec![
            Course::new(id("linux"), "Linux").with_stage("DevOps Pathway", "Linux Foundations", 0),
            Course::new(id("docker"), "Docker")
                .with_stage("DevOps Pathway", "Containers", 1)
                .with_prerequisite(id("linux")),
            Course::new(id("k8s"), "Kubernetes")
                .with_stage("DevOps Pathway", "Orchestration", 2)
                .with_prerequisite(id("docker")),
            Course::new(id("intro"), "Intro"),
        ])
    }

    #[tokio::test]
    async fn test_overview_anonymous() {
        let service = PathwayService::new(catalog());
        let overview = service.overview(None, "DevOps Pathway").await.unwrap();

        let states: Vec<_> = overview.courses.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![CourseState::NotStarted, CourseState::Locked, CourseState::Locked]
        );
        assert_eq!(overview.stats.locked_courses, 2);
    }

    #[tokio::test]
    async fn test_unknown_pathway() {
        let service = PathwayService::new(catalog());
        let err = service.overview(None, "Nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::PathwayNotFound(name) if name == "Nope"));
    }

    #[tokio::test]
    async fn test_enroll_and_progress_unlocks_next_stage() {
        let mut service = PathwayService::new(catalog());
        let session = session();

        let err = service.enroll(&session, &id("docker")).await.unwrap_err();
        match err {
            ServiceError::Locked { reason, .. } => {
                assert_eq!(reason, "Complete Linux Foundations to unlock")
            }
            other => panic!("unexpected error: {other}"),
        }

        service.enroll(&session, &id("linux")).await.unwrap();
        service
            .report(&session, &id("linux"), ProgressEvent::Started)
            .await
            .unwrap();
        let done = service
            .report(
                &session,
                &id("linux"),
                ProgressEvent::Completed { at: Utc::now(), points_earned: 100 },
            )
            .await
            .unwrap();
        assert_eq!(done.status, ProgressStatus::Completed);

        let overview = service.overview(Some(&session), "DevOps Pathway").await.unwrap();
        let states: Vec<_> = overview.courses.iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![CourseState::Completed, CourseState::NotStarted, CourseState::Locked]
        );
        assert_eq!(overview.stats.overall_progress, 33);

        let docker = service.enroll(&session, &id("docker")).await.unwrap();
        assert_eq!(docker.status, ProgressStatus::NotStarted);

        // Enrolling again keeps the existing record
        let again = service.enroll(&session, &id("docker")).await.unwrap();
        assert_eq!(again, docker);
    }

    #[tokio::test]
    async fn test_repeated_completion_awards_points_once() {
        let mut service = PathwayService::new(catalog());
        let session = session();
        service.enroll(&session, &id("intro")).await.unwrap();

        for _ in 0..2 {
            service
                .report(
                    &session,
                    &id("intro"),
                    ProgressEvent::Completed { at: Utc::now(), points_earned: 100 },
                )
                .await
                .unwrap();
        }

        let entries = service.dashboard(&session).await.unwrap();
        assert_eq!(entries[0].points_earned, 100);
    }

    #[tokio::test]
    async fn test_report_requires_enrollment() {
        let mut service = PathwayService::new(catalog());
        let err = service
            .report(&session(), &id("intro"), ProgressEvent::Started)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotEnrolled(_)));
    }

    #[tokio::test]
    async fn test_enroll_unknown_course() {
        let mut service = PathwayService::new(catalog());
        let err = service.enroll(&session(), &id("ghost")).await.unwrap_err();
        assert!(matches!(err, ServiceError::CourseNotFound(_)));
    }

    #[tokio::test]
    async fn test_dashboard_lists_enrollments() {
        let mut service = PathwayService::new(catalog());
        let session = session();
        service.enroll(&session, &id("intro")).await.unwrap();
        service
            .report(
                &session,
                &id("intro"),
                ProgressEvent::Advanced { percentage: 40, current_week: None },
            )
            .await
            .unwrap();

        let entries = service.dashboard(&session).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_deref(), Some("Intro"));
        assert_eq!(entries[0].state, CourseState::InProgress);
        assert_eq!(entries[0].completion_percentage, 40);
        assert!(entries[0].pathway.is_none());
    }

    #[tokio::test]
    async fn test_analyze() {
        let service = PathwayService::new(catalog());
        let report = service.analyze(Some(&session()), "DevOps Pathway").await.unwrap();

        assert!(report.prerequisites.is_consistent());
        assert_eq!(report.prerequisites.blocked.len(), 2);
        assert_eq!(report.estimate.next_stage, Some(id("linux")));
    }
}
