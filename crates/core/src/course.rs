//! Course model - catalog entries and their stage metadata.

use serde::{Deserialize, Serialize};

use crate::id::CourseId;

/// A course as published by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Course title
    pub title: String,

    /// Catalog category
    #[serde(default)]
    pub category: String,

    /// Duration in minutes
    #[serde(default)]
    pub duration: u32,

    /// Difficulty level
    #[serde(default)]
    pub level: Level,

    /// Position of this course inside a pathway, if it belongs to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageInfo>,

    /// Courses that must be completed before this one unlocks
    #[serde(default)]
    pub prerequisites: Vec<CourseId>,
}

impl Course {
    /// Create a course with no stage and no prerequisites.
    pub fn new(id: CourseId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category: String::new(),
            duration: 0,
            level: Level::default(),
            stage: None,
            prerequisites: Vec::new(),
        }
    }

    /// Place the course in a pathway.
    pub fn with_stage(
        mut self,
        pathway: impl Into<String>,
        stage_title: impl Into<String>,
        order: u32,
    ) -> Self {
        self.stage = Some(StageInfo {
            pathway: pathway.into(),
            stage_title: stage_title.into(),
            order,
            estimated_weeks: None,
        });
        self
    }

    /// Add a prerequisite, ignoring duplicates.
    pub fn with_prerequisite(mut self, id: CourseId) -> Self {
        if !self.prerequisites.contains(&id) {
            self.prerequisites.push(id);
        }
        self
    }

    /// Pathway this course is staged in.
    pub fn pathway(&self) -> Option<&str> {
        self.stage.as_ref().map(|s| s.pathway.as_str())
    }

    /// Stage title, if staged.
    pub fn stage_title(&self) -> Option<&str> {
        self.stage.as_ref().map(|s| s.stage_title.as_str())
    }

    /// Stage order, if staged.
    pub fn order(&self) -> Option<u32> {
        self.stage.as_ref().map(|s| s.order)
    }

    /// Whether the course has any prerequisite.
    pub fn has_prerequisites(&self) -> bool {
        !self.prerequisites.is_empty()
    }
}

/// Stage metadata for a course within a pathway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageInfo {
    /// Owning pathway name
    pub pathway: String,

    /// Display title of the stage
    pub stage_title: String,

    /// Position within the pathway (ascending)
    pub order: u32,

    /// Expected length of the stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_weeks: Option<u32>,
}

/// Course difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// No prior knowledge expected
    #[default]
    Beginner,
    /// Builds on introductory material
    Intermediate,
    /// For experienced learners
    Advanced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_parses_camel_case() {
        let json = r#"{
            "id": "k8s",
            "title": "Kubernetes Basics",
            "category": "DevOps",
            "duration": 240,
            "level": "intermediate",
            "stage": {
                "pathway": "DevOps Pathway",
                "stageTitle": "Orchestration",
                "order": 2,
                "estimatedWeeks": 4
            },
            "prerequisites": ["docker"]
        }"#;

        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.level, Level::Intermediate);
        assert_eq!(course.pathway(), Some("DevOps Pathway"));
        assert_eq!(course.stage_title(), Some("Orchestration"));
        assert_eq!(course.order(), Some(2));
        assert_eq!(course.prerequisites, vec!["docker".parse::<CourseId>().unwrap()]);
    }

    #[test]
    fn test_course_defaults_missing_fields() {
        let course: Course = serde_json::from_str(r#"{"id": "intro", "title": "Intro"}"#).unwrap();
        assert!(course.stage.is_none());
        assert!(!course.has_prerequisites());
        assert_eq!(course.level, Level::Beginner);
    }

    #[test]
    fn test_with_prerequisite_dedups() {
        let a: CourseId = "a".parse().unwrap();
        let course = Course::new("b".parse().unwrap(), "B")
            .with_prerequisite(a.clone())
            .with_prerequisite(a);
        assert_eq!(course.prerequisites.len(), 1);
    }
}
