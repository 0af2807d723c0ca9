//! Pathway model - an ordered curriculum of staged courses.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::course::Course;
use crate::error::{ModelError, Result};
use crate::id::CourseId;

/// A named, ordered sequence of courses.
///
/// Courses are kept sorted by ascending stage order. Orders are unique but
/// may be sparse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPathway")]
pub struct Pathway {
    name: String,
    courses: Vec<Course>,
}

#[derive(Deserialize)]
struct RawPathway {
    name: String,
    #[serde(default)]
    courses: Vec<Course>,
}

impl TryFrom<RawPathway> for Pathway {
    type Error = ModelError;

    fn try_from(raw: RawPathway) -> Result<Self> {
        Pathway::new(raw.name, raw.courses)
    }
}

impl Pathway {
    /// Build a pathway from its courses.
    ///
    /// Every course must be staged in `name`, and no two courses may share
    /// an order.
    pub fn new(name: impl Into<String>, mut courses: Vec<Course>) -> Result<Self> {
        let name = name.into();

        let mut seen = HashSet::new();
        for course in &courses {
            let Some(order) = course.stage.as_ref().filter(|s| s.pathway == name).map(|s| s.order) else {
                return Err(ModelError::ForeignCourse {
                    pathway: name,
                    course: course.id.to_string(),
                });
            };
            if !seen.insert(order) {
                return Err(ModelError::DuplicateStageOrder { pathway: name, order });
            }
        }

        courses.sort_by_key(|c| c.order());
        Ok(Self { name, courses })
    }

    /// An empty pathway.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            courses: Vec::new(),
        }
    }

    /// Pathway name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Courses in ascending stage order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Number of stages.
    pub fn total_stages(&self) -> usize {
        self.courses.len()
    }

    /// Whether the pathway has no stages.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Find a course of this pathway by id.
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| &c.id == id)
    }

    /// Whether `id` is a stage of this pathway.
    pub fn contains(&self, id: &CourseId) -> bool {
        self.course(id).is_some()
    }

    /// Course ids in stage order.
    pub fn course_ids(&self) -> Vec<CourseId> {
        self.courses.iter().map(|c| c.id.clone()).collect()
    }
}
