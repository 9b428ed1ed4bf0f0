//! Lock registry consulted before deleting documents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::{FileId, FolderId};

/// Something that can carry a lock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum LockedResource {
    /// A folder.
    Folder(FolderId),
    /// A file.
    File(FileId),
}

/// Read-only view of the externally owned lock table.
#[async_trait]
pub trait LockRegistry: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the resource itself has an unexpired lock.
    async fn is_locked(&self, resource: LockedResource) -> AppResult<bool>;
}
