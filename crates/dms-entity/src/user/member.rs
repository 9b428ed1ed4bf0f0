//! Project membership model.

use dms_core::types::{MemberId, ProjectId, RoleId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's role assignment in a project. A user holding several roles
/// has one row per role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    /// Unique membership identifier.
    pub id: MemberId,
    /// The project.
    pub project_id: ProjectId,
    /// The member.
    pub user_id: UserId,
    /// The assigned role.
    pub role_id: RoleId,
}
