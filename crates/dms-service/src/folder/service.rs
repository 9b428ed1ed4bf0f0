//! Folder lifecycle operations with capability and permission enforcement.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::traits::{LockRegistry, StorageProvider};
use dms_core::types::{FolderId, ProjectId};
use dms_database::DatabasePool;
use dms_database::repositories::FolderRepository;
use dms_entity::folder::{CreateFolder, Folder, valid_title};
use dms_entity::status::EntryStatus;
use dms_entity::user::Capability;

use crate::context::RequestContext;
use crate::guard;
use crate::purge;
use crate::scope::Scope;

/// Manages the folder hierarchy of projects.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Database pool.
    pub(crate) db: Arc<DatabasePool>,
    /// Revision blob storage.
    pub(crate) storage: Arc<dyn StorageProvider>,
    /// Externally owned lock records.
    locks: Arc<dyn LockRegistry>,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Parent folder ID (None for the project root).
    pub parent_id: Option<FolderId>,
    /// Proposed title; sanitized before saving.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Display position among siblings.
    #[serde(default)]
    pub position: i64,
}

/// Request to update a folder's details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        db: Arc<DatabasePool>,
        storage: Arc<dyn StorageProvider>,
        locks: Arc<dyn LockRegistry>,
    ) -> Self {
        Self { db, storage, locks }
    }

    /// Creates a folder under a parent or at the project root.
    pub async fn create(&self, ctx: &RequestContext, req: CreateFolderRequest) -> AppResult<Folder> {
        let title = valid_title(&req.title);
        let mut tx = self.db.begin().await?;

        let mut scope = Scope::load(&mut tx, ctx, req.project_id).await?;
        scope.require(Capability::FolderManipulation)?;

        if let Some(parent_id) = req.parent_id {
            let parent = FolderRepository::get(&mut tx, parent_id).await?;
            if parent.project_id != req.project_id {
                return Err(AppError::validation(format!(
                    "Folder {parent_id} belongs to another project"
                )));
            }
            scope.require_live(parent_id)?;
        }

        if FolderRepository::title_taken(&mut tx, req.project_id, req.parent_id, &title, None).await? {
            return Err(AppError::conflict(format!("Folder '{title}' already exists")));
        }

        let folder = FolderRepository::create(
            &mut tx,
            &CreateFolder {
                project_id: req.project_id,
                parent_id: req.parent_id,
                title,
                description: req.description,
                position: req.position,
            },
            ctx.user_id(),
        )
        .await?;
        tx.commit().await?;

        info!(
            user = %ctx.actor(),
            folder_id = %folder.id,
            project_id = %folder.project_id,
            title = %folder.title,
            "Folder created"
        );
        Ok(folder)
    }

    /// Renames a folder or changes its description.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        req: UpdateFolderRequest,
    ) -> AppResult<Folder> {
        let mut tx = self.db.begin().await?;
        let folder = FolderRepository::get(&mut tx, folder_id).await?;

        let mut scope = Scope::load(&mut tx, ctx, folder.project_id).await?;
        scope.require(Capability::FolderManipulation)?;
        scope.require_live(folder_id)?;

        let title = req
            .title
            .as_deref()
            .map(valid_title)
            .unwrap_or_else(|| folder.title.clone());
        let description = req.description.unwrap_or_else(|| folder.description.clone());

        if title != folder.title
            && FolderRepository::title_taken(
                &mut tx,
                folder.project_id,
                folder.parent_id,
                &title,
                Some(folder_id),
            )
            .await?
        {
            return Err(AppError::conflict(format!("Folder '{title}' already exists")));
        }

        let updated = FolderRepository::update_details(&mut tx, folder_id, &title, &description).await?;
        tx.commit().await?;

        info!(user = %ctx.actor(), folder_id = %folder_id, title = %updated.title, "Folder updated");
        Ok(updated)
    }

    /// Gets a live folder the principal may view.
    pub async fn get(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        let mut conn = self.db.acquire().await?;
        let folder = FolderRepository::get(&mut conn, folder_id).await?;

        let mut scope = Scope::load(&mut conn, ctx, folder.project_id).await?;
        scope.require(Capability::ViewDmsfFolders)?;
        if scope.acl.in_trash(folder_id) {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        scope.require_permitted(folder_id)?;
        Ok(folder)
    }

    /// Non-deleted folders of the project the principal may view.
    ///
    /// Each folder is judged on its own: a deleted ancestor hides it, and
    /// so do the permission entries nearest to it. Principals without the
    /// view capability get an empty list.
    pub async fn visible(&self, ctx: &RequestContext, project_id: ProjectId) -> AppResult<Vec<Folder>> {
        let mut conn = self.db.acquire().await?;
        let mut scope = Scope::load(&mut conn, ctx, project_id).await?;
        if !scope.allowed_to(Capability::ViewDmsfFolders) {
            return Ok(Vec::new());
        }

        let folders = FolderRepository::list_by_project(&mut conn, project_id).await?;
        Ok(folders
            .into_iter()
            .filter(|f| scope.acl.is_visible(f.id))
            .collect())
    }

    /// Whether the folder's effective permission entries admit the principal.
    ///
    /// The entries of the nearest folder on the ancestor-or-self chain that
    /// has any decide; a chain without entries is open.
    pub async fn permissions(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<bool> {
        let mut conn = self.db.acquire().await?;
        let folder = FolderRepository::get(&mut conn, folder_id).await?;
        let mut scope = Scope::load(&mut conn, ctx, folder.project_id).await?;
        Ok(scope.acl.permits(folder_id))
    }

    /// Deletes a folder.
    ///
    /// A soft delete moves an empty, unlocked folder to the trash. A hard
    /// delete purges the folder with its whole subtree, files, revisions
    /// and links; from the active state it is refused while locked.
    pub async fn delete(&self, ctx: &RequestContext, folder_id: FolderId, hard: bool) -> AppResult<()> {
        let (folder, chain) = {
            let mut conn = self.db.acquire().await?;
            let folder = FolderRepository::get(&mut conn, folder_id).await?;
            let mut scope = Scope::load(&mut conn, ctx, folder.project_id).await?;
            scope.require(Capability::FolderManipulation)?;
            scope.require_permitted(folder_id)?;
            let chain = FolderRepository::ancestors_and_self(&mut conn, folder_id).await?;
            (folder, chain)
        };

        if folder.is_deleted() && !hard {
            return Err(AppError::validation(format!("Folder {folder_id} is already deleted")));
        }

        if !folder.is_deleted() {
            if let Err(e) = guard::ensure_folder_unlocked(self.locks.as_ref(), &chain).await {
                warn!(user = %ctx.actor(), folder_id = %folder_id, "Refused to delete locked folder");
                return Err(e);
            }
        }

        let mut tx = self.db.begin().await?;
        let current = FolderRepository::get(&mut tx, folder_id).await?;
        if current.status != folder.status {
            return Err(AppError::conflict(format!("Folder {folder_id} changed concurrently")));
        }
        if !folder.is_deleted() {
            guard::ensure_folder_unlocked_in(&mut tx, &chain).await?;
        }

        if hard {
            let blobs = purge::purge_folder(&mut tx, folder_id).await?;
            tx.commit().await?;
            purge::remove_blobs(self.storage.as_ref(), &blobs).await;
            info!(
                user = %ctx.actor(),
                folder_id = %folder_id,
                project_id = %folder.project_id,
                blobs = blobs.len(),
                "Folder purged"
            );
        } else {
            if FolderRepository::has_active_content(&mut tx, folder_id).await? {
                warn!(user = %ctx.actor(), folder_id = %folder_id, "Refused to delete non-empty folder");
                return Err(AppError::validation("Folder is not empty"));
            }
            FolderRepository::set_status(&mut tx, folder_id, EntryStatus::Deleted, ctx.user_id()).await?;
            tx.commit().await?;
            info!(
                user = %ctx.actor(),
                folder_id = %folder_id,
                project_id = %folder.project_id,
                "Folder moved to trash"
            );
        }
        Ok(())
    }

    /// Restores a deleted folder. Every ancestor must be active.
    pub async fn restore(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        let mut tx = self.db.begin().await?;
        let folder = FolderRepository::get(&mut tx, folder_id).await?;

        let mut scope = Scope::load(&mut tx, ctx, folder.project_id).await?;
        scope.require(Capability::FolderManipulation)?;
        scope.require_permitted(folder_id)?;

        if !folder.is_deleted() {
            return Ok(folder);
        }

        let chain = FolderRepository::ancestors_and_self(&mut tx, folder_id).await?;
        if chain.iter().skip(1).any(Folder::is_deleted) {
            warn!(user = %ctx.actor(), folder_id = %folder_id, "Refused to restore into deleted parent");
            return Err(AppError::validation("Parent folder is deleted"));
        }

        if FolderRepository::title_taken(
            &mut tx,
            folder.project_id,
            folder.parent_id,
            &folder.title,
            Some(folder_id),
        )
        .await?
        {
            return Err(AppError::conflict(format!("Folder '{}' already exists", folder.title)));
        }

        FolderRepository::set_status(&mut tx, folder_id, EntryStatus::Active, None).await?;
        let restored = FolderRepository::get(&mut tx, folder_id).await?;
        tx.commit().await?;

        info!(
            user = %ctx.actor(),
            folder_id = %folder_id,
            project_id = %folder.project_id,
            "Folder restored"
        );
        Ok(restored)
    }

    /// Moves a folder under a new parent, possibly in another project.
    ///
    /// The whole subtree follows: every descendant folder, file and link
    /// takes the new project. Parent pointers inside the subtree are kept.
    pub async fn move_to(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_project: ProjectId,
        new_parent: Option<FolderId>,
    ) -> AppResult<Folder> {
        let mut tx = self.db.begin().await?;
        let folder = FolderRepository::get(&mut tx, folder_id).await?;

        let mut source = Scope::load(&mut tx, ctx, folder.project_id).await?;
        source.require(Capability::FolderManipulation)?;
        source.require_live(folder_id)?;

        let mut target = if new_project == folder.project_id {
            source
        } else {
            Scope::load(&mut tx, ctx, new_project).await?
        };
        target.require(Capability::FolderManipulation)?;
        self.check_destination(&mut tx, &mut target, folder_id, new_project, new_parent)
            .await
            .inspect_err(|e| {
                warn!(user = %ctx.actor(), folder_id = %folder_id, error = %e, "Refused to move folder");
            })?;

        if FolderRepository::title_taken(&mut tx, new_project, new_parent, &folder.title, Some(folder_id))
            .await?
        {
            return Err(AppError::conflict(format!("Folder '{}' already exists", folder.title)));
        }

        FolderRepository::set_parent(&mut tx, folder_id, new_parent, new_project).await?;
        if new_project != folder.project_id {
            FolderRepository::reassign_subtree_project(&mut tx, folder_id, new_project).await?;
        }
        let moved = FolderRepository::get(&mut tx, folder_id).await?;
        tx.commit().await?;

        info!(
            user = %ctx.actor(),
            folder_id = %folder_id,
            from_project = %folder.project_id,
            project_id = %new_project,
            parent_id = ?new_parent,
            "Folder moved"
        );
        Ok(moved)
    }

    /// Validates a move or copy destination.
    ///
    /// The parent must exist in the target project, be live and permitted,
    /// and its ancestor chain must not pass through the folder itself.
    pub(crate) async fn check_destination(
        &self,
        conn: &mut sqlx::SqliteConnection,
        target: &mut Scope,
        folder_id: FolderId,
        new_project: ProjectId,
        new_parent: Option<FolderId>,
    ) -> AppResult<()> {
        let Some(parent_id) = new_parent else {
            return Ok(());
        };

        let parent = FolderRepository::get(conn, parent_id).await?;
        if parent.project_id != new_project {
            return Err(AppError::validation(format!(
                "Folder {parent_id} belongs to another project"
            )));
        }

        let chain = FolderRepository::ancestors_and_self(conn, parent_id).await?;
        if chain.iter().any(|f| f.id == folder_id) {
            return Err(AppError::cycle(
                "Cannot move a folder into itself or one of its subfolders",
            ));
        }

        target.require_live(parent_id)
    }
}
