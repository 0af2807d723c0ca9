//! In-memory storage, for tests and demos.

use std::collections::HashMap;

use eduhub_core::{Course, CourseId, UserCourseProgress, UserId};

use super::{Catalog, EnrollmentStore, Result};

/// Storage backend holding everything in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    courses: HashMap<CourseId, Course>,
    progress: HashMap<(UserId, CourseId), UserCourseProgress>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with catalog courses.
    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        Self {
            courses: courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
            progress: HashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl Catalog for MemoryStorage {
    async fn save_course(&mut self, course: &Course) -> Result<()> {
        self.courses.insert(course.id.clone(), course.clone());
        Ok(())
    }

    async fn load_course(&self, id: &CourseId) -> Result<Option<Course>> {
        Ok(self.courses.get(id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let mut courses: Vec<Course> = self.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(courses)
    }
}

#[async_trait::async_trait]
impl EnrollmentStore for MemoryStorage {
    async fn save_progress(&mut self, progress: &UserCourseProgress) -> Result<()> {
        self.progress.insert(
            (progress.user_id.clone(), progress.course_id.clone()),
            progress.clone(),
        );
        Ok(())
    }

    async fn load_progress(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<Option<UserCourseProgress>> {
        Ok(self.progress.get(&(user.clone(), course.clone())).cloned())
    }

    async fn list_progress(&self, user: &UserId) -> Result<Vec<UserCourseProgress>> {
        let mut records: Vec<UserCourseProgress> = self
            .progress
            .values()
            .filter(|p| &p.user_id == user)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.course_id.cmp(&b.course_id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_progress_is_per_user() {
        let mut storage = MemoryStorage::new();
        let course: CourseId = "c1".parse().unwrap();
        let alice: UserId = "alice".parse().unwrap();
        let bob: UserId = "bob".parse().unwrap();

        storage
            .save_progress(&UserCourseProgress::enroll(alice.clone(), course.clone(), 3))
            .await
            .unwrap();

        assert!(storage.load_progress(&alice, &course).await.unwrap().is_some());
        assert!(storage.load_progress(&bob, &course).await.unwrap().is_none());
        assert!(storage.list_progress(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_pathways() {
        let storage = MemoryStorage::with_courses(vec![
            Course::new("b".parse().unwrap(), "B").with_stage("P", "Second", 1),
            Course::new("a".parse().unwrap(), "A").with_stage("P", "First", 0),
        ]);

        let pathway = storage.load_pathway("P").await.unwrap();
        assert_eq!(pathway.courses()[0].stage_title(), Some("First"));
        assert_eq!(storage.list_pathways().await.unwrap(), vec!["P".to_string()]);
    }
}
