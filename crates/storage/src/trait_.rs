//! Storage trait abstraction.

use async_trait::async_trait;
use eduhub_core::{Course, CourseId, ModelError, Pathway, ProgressMap, UserCourseProgress, UserId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored data violates a model invariant
    #[error("Invalid data: {0}")]
    Invalid(#[from] ModelError),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored record is keyed differently from the one requested
    #[error("Record at {path} belongs to {found}, expected {expected}")]
    Mismatch {
        /// Where the record was read from
        path: String,
        /// Key that was asked for
        expected: String,
        /// Key stored in the record
        found: String,
    },
}

/// Read/write access to the course catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Save a course (create or update).
    async fn save_course(&mut self, course: &Course) -> Result<()>;

    /// Load a course by ID.
    async fn load_course(&self, id: &CourseId) -> Result<Option<Course>>;

    /// List every course in the catalog.
    ///
    /// Unreadable entries are skipped with a warning; `load_course` reports
    /// them as errors.
    async fn list_courses(&self) -> Result<Vec<Course>>;

    /// Load the pathway named `name`.
    ///
    /// A name no course is staged in yields an empty pathway.
    async fn load_pathway(&self, name: &str) -> Result<Pathway> {
        let courses: Vec<Course> = self
            .list_courses()
            .await?
            .into_iter()
            .filter(|c| c.pathway() == Some(name))
            .collect();
        Ok(Pathway::new(name, courses)?)
    }

    /// Names of all pathways, sorted.
    async fn list_pathways(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .list_courses()
            .await?
            .iter()
            .filter_map(|c| c.pathway().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Per-user enrollment and progress records.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Save a progress record (create or update).
    async fn save_progress(&mut self, progress: &UserCourseProgress) -> Result<()>;

    /// Load a user's progress on one course.
    ///
    /// Unreadable records, and records stored for another user or course,
    /// are errors.
    async fn load_progress(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<Option<UserCourseProgress>>;

    /// List every progress record of a user.
    ///
    /// Fails on any record `load_progress` would fail on.
    async fn list_progress(&self, user: &UserId) -> Result<Vec<UserCourseProgress>>;

    /// A user's progress on the given courses, keyed by course id.
    ///
    /// Courses without a record are absent from the map.
    async fn progress_for(&self, user: &UserId, courses: &[CourseId]) -> Result<ProgressMap> {
        let mut map = ProgressMap::new();
        for course in courses {
            if let Some(progress) = self.load_progress(user, course).await? {
                map.insert(course.clone(), progress);
            }
        }
        Ok(map)
    }
}
