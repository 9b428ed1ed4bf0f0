//! File entity model.

use chrono::{DateTime, Utc};
use dms_core::types::{FileId, FolderId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::EntryStatus;

/// A document stored in a folder (or at the project root).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The owning project.
    pub project_id: ProjectId,
    /// Containing folder (None for the project root).
    pub folder_id: Option<FolderId>,
    /// File name including extension.
    pub name: String,
    /// Soft-delete state.
    pub status: EntryStatus,
    /// Who moved the file to the trash.
    pub deleted_by: Option<UserId>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Check if this file is in the trash.
    pub fn is_deleted(&self) -> bool {
        self.status == EntryStatus::Deleted
    }
}

/// Data required to create a new file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The owning project.
    pub project_id: ProjectId,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// File name.
    pub name: String,
}
