//! EduHub core data models.
//!
//! Courses, pathways, per-user progress and the display states derived
//! from them. Upstream payloads are validated while deserializing, so
//! anything holding these types already satisfies their invariants.

#![warn(missing_docs)]

// Core identities
mod id;
mod error;

// Catalog
mod course;
mod pathway;

// Learners
mod progress;
mod session;
mod state;

// Re-exports
pub use id::{CourseId, UserId};
pub use error::{ModelError, Result};

pub use course::{Course, Level, StageInfo};
pub use pathway::Pathway;

pub use progress::{ProgressEvent, ProgressMap, ProgressStatus, UserCourseProgress};
pub use session::{Role, UserSession};
pub use state::{ButtonAction, CourseState, PathwayStats};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
