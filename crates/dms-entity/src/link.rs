//! Link entity model.

use chrono::{DateTime, Utc};
use dms_core::types::{FolderId, LinkId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::status::EntryStatus;

/// What kind of entity a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkTargetType {
    /// The link points at a folder.
    Folder,
    /// The link points at a file.
    File,
}

impl LinkTargetType {
    /// Return the target type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

/// A reference record placed in a folder and pointing at a folder or a
/// file elsewhere, possibly in another project. Traversal never follows it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Link {
    /// Unique link identifier.
    pub id: LinkId,
    /// The project of the containing folder.
    pub project_id: ProjectId,
    /// Containing folder (None for the project root).
    pub folder_id: Option<FolderId>,
    /// Display name.
    pub name: String,
    /// Kind of the target.
    pub target_type: LinkTargetType,
    /// Target folder or file id.
    pub target_id: Uuid,
    /// Project of the target.
    pub target_project_id: ProjectId,
    /// Soft-delete state.
    pub status: EntryStatus,
    /// Who moved the link to the trash.
    pub deleted_by: Option<UserId>,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Check if this link is in the trash.
    pub fn is_deleted(&self) -> bool {
        self.status == EntryStatus::Deleted
    }
}

/// Data required to create a new link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLink {
    /// The project of the containing folder.
    pub project_id: ProjectId,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// Display name.
    pub name: String,
    /// Kind of the target.
    pub target_type: LinkTargetType,
    /// Target id.
    pub target_id: Uuid,
    /// Project of the target.
    pub target_project_id: ProjectId,
}
