//! File lifecycle operations with capability and permission enforcement.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{info, warn};

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::traits::{LockRegistry, StorageProvider};
use dms_core::types::{FileId, FolderId, ProjectId};
use dms_database::DatabasePool;
use dms_database::repositories::{FileRepository, FolderRepository};
use dms_entity::file::{CreateFile, File, Revision};
use dms_entity::folder::Folder;
use dms_entity::status::EntryStatus;
use dms_entity::user::Capability;

use crate::context::RequestContext;
use crate::guard;
use crate::purge;
use crate::scope::Scope;

/// Handles files and their revisions.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Database pool.
    db: Arc<DatabasePool>,
    /// Revision blob storage.
    storage: Arc<dyn StorageProvider>,
    /// Externally owned lock records.
    locks: Arc<dyn LockRegistry>,
}

/// Request to upload a new file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Containing folder (None for the project root).
    pub folder_id: Option<FolderId>,
    /// File name.
    pub name: String,
    /// MIME type of the content.
    pub mime_type: Option<String>,
    /// Content of the first revision.
    #[serde(skip)]
    pub content: Bytes,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        db: Arc<DatabasePool>,
        storage: Arc<dyn StorageProvider>,
        locks: Arc<dyn LockRegistry>,
    ) -> Self {
        Self { db, storage, locks }
    }

    /// Stores a new file with its first revision.
    pub async fn create_file(
        &self,
        ctx: &RequestContext,
        req: CreateFileRequest,
    ) -> AppResult<(File, Revision)> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }

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

        if FileRepository::name_taken(&mut tx, req.project_id, req.folder_id, &name).await? {
            return Err(AppError::conflict(format!("File '{name}' already exists")));
        }

        let file = FileRepository::create(
            &mut tx,
            &CreateFile {
                project_id: req.project_id,
                folder_id: req.folder_id,
                name: name.clone(),
            },
        )
        .await?;
        let revision = FileRepository::add_revision(
            &mut tx,
            file.id,
            &name,
            req.content.len() as i64,
            req.mime_type.as_deref(),
            ctx.user_id(),
        )
        .await?;

        self.storage
            .write(&revision.disk_filename, req.content)
            .await?;
        if let Err(e) = tx.commit().await {
            purge::remove_blobs(self.storage.as_ref(), &[revision.disk_filename.clone()]).await;
            return Err(e.into());
        }

        info!(
            user = %ctx.actor(),
            file_id = %file.id,
            project_id = %file.project_id,
            folder_id = ?file.folder_id,
            size = revision.size_bytes,
            "File created"
        );
        Ok((file, revision))
    }

    /// Gets a live file the principal may view.
    pub async fn get(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let mut conn = self.db.acquire().await?;
        let file = FileRepository::get(&mut conn, file_id).await?;
        let mut scope = Scope::load(&mut conn, ctx, file.project_id).await?;
        scope.require(Capability::ViewDmsfFiles)?;
        if file.is_deleted() {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        scope.require_container(file.folder_id)?;
        Ok(file)
    }

    /// The newest revision of a file.
    pub async fn latest_revision(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<Revision> {
        self.get(ctx, file_id).await?;
        let mut conn = self.db.acquire().await?;
        FileRepository::latest_revision(&mut conn, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} has no revision")))
    }

    /// Content of the newest revision.
    pub async fn content(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<Bytes> {
        let revision = self.latest_revision(ctx, file_id).await?;
        self.storage.read_bytes(&revision.disk_filename).await
    }

    /// Deletes a file: to the trash, or permanently with its revisions.
    pub async fn delete(&self, ctx: &RequestContext, file_id: FileId, hard: bool) -> AppResult<()> {
        let (file, chain) = {
            let mut conn = self.db.acquire().await?;
            let file = FileRepository::get(&mut conn, file_id).await?;
            let mut scope = Scope::load(&mut conn, ctx, file.project_id).await?;
            scope.require(Capability::FileDelete)?;
            if let Some(folder_id) = file.folder_id {
                scope.require_permitted(folder_id)?;
            }
            let chain = folder_chain(&mut conn, file.folder_id).await?;
            (file, chain)
        };

        if file.is_deleted() && !hard {
            return Err(AppError::validation(format!("File {file_id} is already deleted")));
        }
        if !file.is_deleted() {
            if let Err(e) = guard::ensure_file_unlocked(self.locks.as_ref(), &file, &chain).await {
                warn!(user = %ctx.actor(), file_id = %file_id, "Refused to delete locked file");
                return Err(e);
            }
        }

        let mut tx = self.db.begin().await?;
        if hard {
            let blobs = purge::purge_file(&mut tx, file_id).await?;
            tx.commit().await?;
            purge::remove_blobs(self.storage.as_ref(), &blobs).await;
            info!(user = %ctx.actor(), file_id = %file_id, blobs = blobs.len(), "File purged");
        } else {
            FileRepository::set_status(&mut tx, file_id, EntryStatus::Deleted, ctx.user_id()).await?;
            tx.commit().await?;
            info!(user = %ctx.actor(), file_id = %file_id, "File moved to trash");
        }
        Ok(())
    }

    /// Restores a deleted file. Its folder chain must be active.
    pub async fn restore(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let mut tx = self.db.begin().await?;
        let file = FileRepository::get(&mut tx, file_id).await?;
        let mut scope = Scope::load(&mut tx, ctx, file.project_id).await?;
        scope.require(Capability::ViewDmsfFiles)?;
        if let Some(folder_id) = file.folder_id {
            scope.require_permitted(folder_id)?;
        }

        if !file.is_deleted() {
            return Ok(file);
        }

        let chain = folder_chain(&mut tx, file.folder_id).await?;
        if chain.iter().any(Folder::is_deleted) {
            return Err(AppError::validation("Parent folder is deleted"));
        }
        if FileRepository::name_taken(&mut tx, file.project_id, file.folder_id, &file.name).await? {
            return Err(AppError::conflict(format!("File '{}' already exists", file.name)));
        }

        FileRepository::set_status(&mut tx, file_id, EntryStatus::Active, None).await?;
        let restored = FileRepository::get(&mut tx, file_id).await?;
        tx.commit().await?;

        info!(user = %ctx.actor(), file_id = %file_id, "File restored");
        Ok(restored)
    }
}

/// The containing folder and its ancestors, nearest first.
async fn folder_chain(conn: &mut SqliteConnection, folder_id: Option<FolderId>) -> AppResult<Vec<Folder>> {
    match folder_id {
        Some(id) => FolderRepository::ancestors_and_self(conn, id).await,
        None => Ok(Vec::new()),
    }
}
