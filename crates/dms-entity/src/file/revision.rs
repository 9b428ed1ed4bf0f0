//! File revision model.

use chrono::{DateTime, Utc};
use dms_core::types::{FileId, RevisionId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One stored version of a file's content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Revision {
    /// Unique revision identifier.
    pub id: RevisionId,
    /// The file this revision belongs to.
    pub file_id: FileId,
    /// Monotonic revision number, starting at 1.
    pub revision_no: i64,
    /// Title at the time of the revision.
    pub title: String,
    /// Key of the content blob in the storage provider.
    pub disk_filename: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Author of the revision.
    pub created_by: Option<UserId>,
    /// When the revision was stored.
    pub created_at: DateTime<Utc>,
}

impl Revision {
    /// Storage key for a revision's content.
    pub fn storage_key(id: RevisionId) -> String {
        format!("revisions/{id}")
    }
}
