//! Folder entity model.

use chrono::{DateTime, Utc};
use dms_core::types::{FolderId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::EntryStatus;

/// A folder in a project's document tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The owning project.
    pub project_id: ProjectId,
    /// Parent folder (None for folders at the project root).
    pub parent_id: Option<FolderId>,
    /// Sanitized title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Display position among siblings.
    pub position: i64,
    /// Soft-delete state.
    pub status: EntryStatus,
    /// Who moved the folder to the trash.
    pub deleted_by: Option<UserId>,
    /// Who created the folder.
    pub created_by: Option<UserId>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this folder sits at the project root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this folder is in the trash.
    pub fn is_deleted(&self) -> bool {
        self.status == EntryStatus::Deleted
    }

    /// Sort key used for every ordered listing: position, then title.
    pub fn sort_key(&self) -> (i64, String) {
        (self.position, self.title.to_lowercase())
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The owning project.
    pub project_id: ProjectId,
    /// Parent folder (None for the project root).
    pub parent_id: Option<FolderId>,
    /// Proposed title; sanitized before insert.
    pub title: String,
    /// Description.
    pub description: String,
    /// Display position.
    pub position: i64,
}
