//! Lists deleted folders, files and links of a project.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dms_core::result::AppResult;
use dms_core::types::ProjectId;
use dms_database::DatabasePool;
use dms_database::repositories::{FileRepository, FolderRepository, LinkRepository};
use dms_entity::file::File;
use dms_entity::folder::Folder;
use dms_entity::link::Link;
use dms_entity::user::Capability;

use crate::context::RequestContext;
use crate::scope::Scope;

/// Deleted entries of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrashListing {
    /// Deleted folders.
    pub folders: Vec<Folder>,
    /// Deleted files.
    pub files: Vec<File>,
    /// Deleted links.
    pub links: Vec<Link>,
}

impl TrashListing {
    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len() + self.links.len()
    }

    /// Whether the trash is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trash bin of a project.
#[derive(Debug, Clone)]
pub struct TrashService {
    db: Arc<DatabasePool>,
}

impl TrashService {
    /// Creates a new trash service.
    pub fn new(db: Arc<DatabasePool>) -> Self {
        Self { db }
    }

    /// Deleted entries the principal may see. Requires `file_delete`.
    pub async fn trash(&self, ctx: &RequestContext, project_id: ProjectId) -> AppResult<TrashListing> {
        let mut conn = self.db.acquire().await?;
        let mut scope = Scope::load(&mut conn, ctx, project_id).await?;
        scope.require(Capability::FileDelete)?;

        let mut listing = TrashListing {
            folders: FolderRepository::list_deleted(&mut conn, project_id).await?,
            files: FileRepository::list_deleted(&mut conn, project_id).await?,
            links: LinkRepository::list_deleted(&mut conn, project_id).await?,
        };

        listing.folders.retain(|f| scope.acl.permits(f.id));
        listing
            .files
            .retain(|f| f.folder_id.is_none_or(|id| scope.acl.permits(id)));
        listing
            .links
            .retain(|l| l.folder_id.is_none_or(|id| scope.acl.permits(id)));

        debug!(project_id = %project_id, entries = listing.len(), "Listed trash");
        Ok(listing)
    }
}
