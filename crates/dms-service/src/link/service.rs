//! Link lifecycle operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FileId, FolderId, LinkId, ProjectId};
use dms_database::DatabasePool;
use dms_database::repositories::{FileRepository, FolderRepository, LinkRepository};
use dms_entity::folder::Folder;
use dms_entity::link::{CreateLink, Link, LinkTargetType};
use dms_entity::status::EntryStatus;
use dms_entity::user::Capability;

use crate::context::RequestContext;
use crate::scope::Scope;

/// What a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum LinkTarget {
    /// A folder.
    Folder(FolderId),
    /// A file.
    File(FileId),
}

/// Request to create a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    /// Project the link lives in.
    pub project_id: ProjectId,
    /// Containing folder (None for the project root).
    pub folder_id: Option<FolderId>,
    /// Link name; defaults to the target's title.
    pub name: Option<String>,
    /// The linked folder or file, possibly in another project.
    pub target: LinkTarget,
}

/// Manages link records. Links are never followed during traversal.
#[derive(Debug, Clone)]
pub struct LinkService {
    /// Database pool.
    db: Arc<DatabasePool>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(db: Arc<DatabasePool>) -> Self {
        Self { db }
    }

    /// Creates a link in a folder.
    pub async fn create_link(&self, ctx: &RequestContext, req: CreateLinkRequest) -> AppResult<Link> {
        let mut tx = self.db.begin().await?;
        let mut scope = Scope::load(&mut tx, ctx, req.project_id).await?;
        scope.require(Capability::FileManipulation)?;
        if let Some(folder_id) = req.folder_id {
            let folder = FolderRepository::get(&mut tx, folder_id).await?;
            if folder.project_id != req.project_id {
                return Err(AppError::validation(format!(
                    "Folder {folder_id} belongs to another project"
                )));
            }
        }
        scope.require_container(req.folder_id)?;

        let (target_type, target_id, target_project_id, target_title) = match req.target {
            LinkTarget::Folder(id) => {
                let folder = FolderRepository::get(&mut tx, id).await?;
                let mut target = Scope::load(&mut tx, ctx, folder.project_id).await?;
                target.require(Capability::ViewDmsfFolders)?;
                target.require_live(id)?;
                (LinkTargetType::Folder, id.into_uuid(), folder.project_id, folder.title)
            }
            LinkTarget::File(id) => {
                let file = FileRepository::get(&mut tx, id).await?;
                if file.is_deleted() {
                    return Err(AppError::validation(format!("File {id} is deleted")));
                }
                let mut target = Scope::load(&mut tx, ctx, file.project_id).await?;
                target.require(Capability::ViewDmsfFiles)?;
                target.require_container(file.folder_id)?;
                (LinkTargetType::File, id.into_uuid(), file.project_id, file.name)
            }
        };

        let name = req
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or(target_title);

        let link = LinkRepository::create(
            &mut tx,
            &CreateLink {
                project_id: req.project_id,
                folder_id: req.folder_id,
                name,
                target_type,
                target_id,
                target_project_id,
            },
        )
        .await?;
        tx.commit().await?;

        info!(
            user = %ctx.actor(),
            link_id = %link.id,
            project_id = %link.project_id,
            target = %link.target_type.as_str(),
            "Link created"
        );
        Ok(link)
    }

    /// Gets a live link.
    pub async fn get(&self, ctx: &RequestContext, link_id: LinkId) -> AppResult<Link> {
        let mut conn = self.db.acquire().await?;
        let link = LinkRepository::get(&mut conn, link_id).await?;
        let mut scope = Scope::load(&mut conn, ctx, link.project_id).await?;
        scope.require(Capability::ViewDmsfFiles)?;
        if link.is_deleted() {
            return Err(AppError::not_found(format!("Link {link_id} not found")));
        }
        scope.require_container(link.folder_id)?;
        Ok(link)
    }

    /// Deletes a link: to the trash, or permanently.
    pub async fn delete(&self, ctx: &RequestContext, link_id: LinkId, hard: bool) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        let link = LinkRepository::get(&mut tx, link_id).await?;
        let mut scope = Scope::load(&mut tx, ctx, link.project_id).await?;
        scope.require(Capability::FileDelete)?;
        if let Some(folder_id) = link.folder_id {
            scope.require_permitted(folder_id)?;
        }

        if hard {
            LinkRepository::delete(&mut tx, link_id).await?;
            tx.commit().await?;
            info!(user = %ctx.actor(), link_id = %link_id, "Link purged");
        } else {
            if link.is_deleted() {
                return Err(AppError::validation(format!("Link {link_id} is already deleted")));
            }
            LinkRepository::set_status(&mut tx, link_id, EntryStatus::Deleted, ctx.user_id()).await?;
            tx.commit().await?;
            info!(user = %ctx.actor(), link_id = %link_id, "Link moved to trash");
        }
        Ok(())
    }

    /// Restores a deleted link. Its folder chain must be active.
    pub async fn restore(&self, ctx: &RequestContext, link_id: LinkId) -> AppResult<Link> {
        let mut tx = self.db.begin().await?;
        let link = LinkRepository::get(&mut tx, link_id).await?;
        let mut scope = Scope::load(&mut tx, ctx, link.project_id).await?;
        scope.require(Capability::ViewDmsfFiles)?;
        if let Some(folder_id) = link.folder_id {
            scope.require_permitted(folder_id)?;
        }

        if !link.is_deleted() {
            return Ok(link);
        }

        if let Some(folder_id) = link.folder_id {
            let chain = FolderRepository::ancestors_and_self(&mut tx, folder_id).await?;
            if chain.iter().any(Folder::is_deleted) {
                return Err(AppError::validation("Parent folder is deleted"));
            }
        }

        LinkRepository::set_status(&mut tx, link_id, EntryStatus::Active, None).await?;
        let restored = LinkRepository::get(&mut tx, link_id).await?;
        tx.commit().await?;

        info!(user = %ctx.actor(), link_id = %link_id, "Link restored");
        Ok(restored)
    }
}
