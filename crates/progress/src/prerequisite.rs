//! Prerequisite analysis.
//!
//! Checks a pathway's prerequisite graph and explains what is keeping a
//! user's locked stages locked:
//! - prerequisites that point outside the pathway
//! - prerequisite cycles (such stages can never unlock)
//! - per locked course, the prerequisites still to complete, with suggestions

use std::collections::{HashMap, HashSet};

use eduhub_core::{Course, CourseId, CourseState, Pathway, ProgressMap, ProgressStatus};
use serde::Serialize;
use tracing::debug;

use crate::engine::ProgressionEngine;

/// Suggested way to unblock a locked course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// The type of suggestion
    pub action: SuggestedAction,
    /// Human readable description
    pub description: String,
    /// Priority (lower = more urgent)
    pub priority: u32,
}

/// Actions that move a locked course towards unlocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuggestedAction {
    /// Finish a prerequisite already in progress
    FinishPrerequisite,
    /// Start a prerequisite not begun yet
    StartPrerequisite,
    /// Catalog data needs fixing
    ReviewCatalog,
}

impl SuggestedAction {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedAction::FinishPrerequisite => "FinishPrerequisite",
            SuggestedAction::StartPrerequisite => "StartPrerequisite",
            SuggestedAction::ReviewCatalog => "ReviewCatalog",
        }
    }
}

/// A locked course and what it waits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedCourse {
    /// Locked course
    pub course_id: CourseId,
    /// Prerequisites not completed yet
    pub waiting_on: Vec<CourseId>,
}

/// Result of prerequisite analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrerequisiteReport {
    /// (course, prerequisite) pairs whose prerequisite is not in the pathway
    pub unresolved: Vec<(CourseId, CourseId)>,
    /// Prerequisite cycles, each listed once
    pub cycles: Vec<Vec<CourseId>>,
    /// Locked courses and their pending prerequisites
    pub blocked: Vec<BlockedCourse>,
    /// Suggestions ordered by priority
    pub suggestions: Vec<Suggestion>,
}

impl PrerequisiteReport {
    /// Whether the catalog data of the pathway is consistent.
    pub fn is_consistent(&self) -> bool {
        self.unresolved.is_empty() && self.cycles.is_empty()
    }
}

/// Analyzes the prerequisite graph of a pathway.
pub struct PrerequisiteAnalyzer<'a> {
    pathway: &'a Pathway,
}

impl<'a> PrerequisiteAnalyzer<'a> {
    /// Create an analyzer for a pathway.
    pub fn new(pathway: &'a Pathway) -> Self {
        Self { pathway }
    }

    /// Full analysis for one user's progress.
    pub fn analyze(&self, progress: &ProgressMap) -> PrerequisiteReport {
        let unresolved = self.unresolved();
        let cycles = self.cycles();
        let blocked = self.blocked(progress);
        let suggestions = self.suggestions(progress, &blocked);

        debug!(
            pathway = self.pathway.name(),
            unresolved = unresolved.len(),
            cycles = cycles.len(),
            blocked = blocked.len(),
            "prerequisite analysis done"
        );

        PrerequisiteReport {
            unresolved,
            cycles,
            blocked,
            suggestions,
        }
    }

    /// Prerequisites that do not resolve to a stage of the pathway.
    pub fn unresolved(&self) -> Vec<(CourseId, CourseId)> {
        let pathway = self.pathway;
        pathway
            .courses()
            .iter()
            .flat_map(move |course| {
                course
                    .prerequisites
                    .iter()
                    .filter(move |p| !pathway.contains(p))
                    .map(move |p| (course.id.clone(), p.clone()))
            })
            .collect()
    }

    /// Detect prerequisite cycles using DFS, in stage order.
    pub fn cycles(&self) -> Vec<Vec<CourseId>> {
        let by_id: HashMap<&CourseId, &Course> =
            self.pathway.courses().iter().map(|c| (&c.id, c)).collect();

        let mut cycles = Vec::new();
        let mut visited: HashSet<&CourseId> = HashSet::new();

        for course in self.pathway.courses() {
            if !visited.contains(&course.id) {
                let mut stack = HashSet::new();
                let mut path = Vec::new();
                find_cycles(&course.id, &by_id, &mut visited, &mut stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    /// Locked courses and the prerequisites each still waits on.
    pub fn blocked(&self, progress: &ProgressMap) -> Vec<BlockedCourse> {
        let engine = ProgressionEngine::new(self.pathway, progress);

        self.pathway
            .courses()
            .iter()
            .filter(|c| engine.state_of(c) == CourseState::Locked)
            .map(|c| BlockedCourse {
                course_id: c.id.clone(),
                waiting_on: c
                    .prerequisites
                    .iter()
                    .filter(|p| !engine.prerequisite_met(p))
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    fn suggestions(&self, progress: &ProgressMap, blocked: &[BlockedCourse]) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();
        let mut seen = HashSet::new();

        for item in blocked {
            let blocked_title = self.title_of(&item.course_id);
            for prereq in &item.waiting_on {
                if !seen.insert(prereq.clone()) {
                    continue;
                }
                let suggestion = match self.pathway.course(prereq) {
                    None => Suggestion {
                        action: SuggestedAction::ReviewCatalog,
                        description: format!(
                            "'{}' requires '{}', which is not part of {}",
                            blocked_title,
                            prereq,
                            self.pathway.name()
                        ),
                        priority: 3,
                    },
                    Some(course) => match progress.get(prereq).map(|p| p.status) {
                        Some(ProgressStatus::InProgress) => Suggestion {
                            action: SuggestedAction::FinishPrerequisite,
                            description: format!(
                                "Finish '{}' to unlock '{}'",
                                course.title, blocked_title
                            ),
                            priority: 1,
                        },
                        _ => Suggestion {
                            action: SuggestedAction::StartPrerequisite,
                            description: format!(
                                "Start '{}' to work towards '{}'",
                                course.title, blocked_title
                            ),
                            priority: 2,
                        },
                    },
                };
                suggestions.push(suggestion);
            }
        }

        suggestions.sort_by_key(|s| s.priority);
        suggestions
    }

    fn title_of(&self, id: &CourseId) -> String {
        self.pathway
            .course(id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

fn find_cycles<'a>(
    node: &'a CourseId,
    by_id: &HashMap<&'a CourseId, &'a Course>,
    visited: &mut HashSet<&'a CourseId>,
    stack: &mut HashSet<&'a CourseId>,
    path: &mut Vec<&'a CourseId>,
    cycles: &mut Vec<Vec<CourseId>>,
) {
    visited.insert(node);
    stack.insert(node);
    path.push(node);

    if let Some(course) = by_id.get(node) {
        for dep in &course.prerequisites {
            // Unresolved prerequisites are reported separately
            let Some((&dep, _)) = by_id.get_key_value(dep) else {
                continue;
            };
            if stack.contains(dep) {
                if let Some(start) = path.iter().position(|id| *id == dep) {
                    cycles.push(path[start..].iter().map(|id| (*id).clone()).collect());
                }
            } else if !visited.contains(dep) {
                find_cycles(dep, by_id, visited, stack, path, cycles);
            }
        }
    }

    path.pop();
    stack.remove(node);
}
