//! Pathway progression.
//!
//! Course unlock states, pathway aggregates, prerequisite analysis and
//! effort estimates, plus a service that runs them against storage.

#![warn(missing_docs)]

pub mod engine;
pub mod prerequisite;
pub mod estimator;
pub mod service;

pub use engine::{
    button_action, compute_pathway_stats, unlock_message, CourseView, PathwayOverview,
    ProgressionEngine, GENERIC_UNLOCK_MESSAGE,
};
pub use prerequisite::{
    BlockedCourse, PrerequisiteAnalyzer, PrerequisiteReport, SuggestedAction, Suggestion,
};
pub use estimator::{CompletionEstimator, PathwayEstimate};
pub use service::{DashboardEntry, PathwayReport, PathwayService, Result, ServiceError};
