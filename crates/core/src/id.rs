//! Unique identifiers for EduHub entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::ModelError;

/// Unique identifier for a Course.
///
/// Catalog ids come from upstream and are opaque strings; locally authored
/// courses get a fresh ULID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(String);

impl CourseId {
    /// Generate a new CourseId
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CourseId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyId("course"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<CourseId> for String {
    fn from(id: CourseId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for CourseId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

/// Unique identifier for a User
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyId("user"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for UserId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_id_rejects_blank() {
        assert!("   ".parse::<CourseId>().is_err());
        assert!("".parse::<UserId>().is_err());
    }

    #[test]
    fn test_course_id_trims() {
        let id: CourseId = " devops-101 ".parse().unwrap();
        assert_eq!(id.as_str(), "devops-101");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(CourseId::generate(), CourseId::generate());
    }

    #[test]
    fn test_id_deserialize_validates() {
        let ok: CourseId = serde_json::from_str("\"c1\"").unwrap();
        assert_eq!(ok.to_string(), "c1");
        assert!(serde_json::from_str::<CourseId>("\"\"").is_err());
    }
}
