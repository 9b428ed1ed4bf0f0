//! The acting principal of a request.

use serde::{Deserialize, Serialize};

use dms_core::types::UserId;

/// Who performs an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    /// A logged-in user.
    User {
        /// The user's ID.
        id: UserId,
        /// Whether the user is a site administrator.
        admin: bool,
    },
    /// A visitor without an account.
    Anonymous,
    /// Maintenance tasks run by the engine itself.
    System,
}

impl Principal {
    /// The user behind the request, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User { id, .. } => Some(*id),
            Self::Anonymous | Self::System => None,
        }
    }

    /// Whether capability and folder permission checks are skipped.
    pub fn bypasses_checks(&self) -> bool {
        matches!(self, Self::User { admin: true, .. } | Self::System)
    }

    /// Short label used in log fields.
    pub fn label(&self) -> String {
        match self {
            Self::User { id, .. } => id.to_string(),
            Self::Anonymous => "anonymous".to_string(),
            Self::System => "system".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass() {
        let id = UserId::new();
        assert!(Principal::User { id, admin: true }.bypasses_checks());
        assert!(!Principal::User { id, admin: false }.bypasses_checks());
        assert!(!Principal::Anonymous.bypasses_checks());
        assert!(Principal::System.bypasses_checks());
        assert_eq!(Principal::User { id, admin: false }.user_id(), Some(id));
        assert_eq!(Principal::Anonymous.user_id(), None);
    }
}
