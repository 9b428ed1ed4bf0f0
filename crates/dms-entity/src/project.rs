//! Project entity model.

use chrono::{DateTime, Utc};
use dms_core::types::{ProjectId, RoleId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project owning a document tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Short unique identifier used in URLs and the CLI.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Whether the document module is enabled for this project.
    pub dms_enabled: bool,
    /// Role applied to logged-in users who are not members.
    pub non_member_role_id: Option<RoleId>,
    /// Role applied to anonymous requests.
    pub anonymous_role_id: Option<RoleId>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Short unique identifier.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Whether the document module starts enabled.
    pub dms_enabled: bool,
}
