//! The authenticated user a request is made on behalf of.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// An authenticated session, passed explicitly to whoever needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// Signed-in user
    pub user_id: UserId,

    /// Name shown in greetings
    pub display_name: String,

    /// Role of the user
    pub role: Role,
}

impl UserSession {
    /// Create a student session.
    pub fn student(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            role: Role::Student,
        }
    }

    /// Whether this user teaches courses.
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }
}

/// User role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Takes courses
    #[default]
    Student,
    /// Teaches courses
    Instructor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_session() {
        let session = UserSession::student("u1".parse().unwrap(), "Sam");
        assert_eq!(session.role, Role::Student);
        assert!(!session.is_instructor());
    }

    #[test]
    fn test_session_parses() {
        let json = r#"{"userId": "t1", "displayName": "Dr. Lee", "role": "instructor"}"#;
        let session: UserSession = serde_json::from_str(json).unwrap();
        assert!(session.is_instructor());
        assert!(serde_json::from_str::<UserSession>(r#"{"userId": "", "displayName": "x", "role": "student"}"#).is_err());
    }
}
