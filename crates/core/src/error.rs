//! Validation errors raised while parsing upstream data.

/// Result alias for model validation.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised when upstream data violates a model invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// An id was empty or whitespace
    #[error("{0} id must not be empty")]
    EmptyId(&'static str),

    /// Completion percentage outside 0..=100
    #[error("completion percentage {0} is outside 0-100")]
    PercentageOutOfRange(u32),

    /// Two courses of one pathway share a stage order
    #[error("pathway '{pathway}' has duplicate stage order {order}")]
    DuplicateStageOrder {
        /// Pathway name
        pathway: String,
        /// Offending order value
        order: u32,
    },

    /// A course was added to a pathway it does not belong to
    #[error("course '{course}' does not belong to pathway '{pathway}'")]
    ForeignCourse {
        /// Pathway name
        pathway: String,
        /// Course id
        course: String,
    },
}
