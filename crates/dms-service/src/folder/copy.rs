//! Structural copy of a folder subtree.

use std::collections::VecDeque;

use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FolderId, ProjectId, UserId};
use dms_database::repositories::{
    CustomFieldRepository, FileRepository, FolderPermissionRepository, FolderRepository,
    LinkRepository,
};
use dms_entity::file::CreateFile;
use dms_entity::folder::{CreateFolder, Folder};
use dms_entity::link::CreateLink;
use dms_entity::user::Capability;

use super::service::FolderService;
use crate::context::RequestContext;
use crate::purge;
use crate::scope::Scope;

/// Where a source folder lands in the copy.
struct Pending {
    source: Folder,
    parent: Option<FolderId>,
}

impl FolderService {
    /// Copies a folder with its visible subtree under a new parent.
    ///
    /// Subfolders carry their permission entries and custom values, files
    /// get their latest revision with a fresh blob, and links are duplicated
    /// as records that still point at the original targets. The copy runs
    /// in one transaction; on failure blobs written so far are removed.
    pub async fn copy_to(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_project: ProjectId,
        new_parent: Option<FolderId>,
    ) -> AppResult<Folder> {
        let mut tx = self.db.begin().await?;
        let mut copied_blobs = Vec::new();

        let result = self
            .copy_subtree(&mut tx, ctx, folder_id, new_project, new_parent, &mut copied_blobs)
            .await;

        let result = match result {
            Ok(copy) => tx.commit().await.map(|()| copy).map_err(AppError::from),
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "Rollback of folder copy failed");
                }
                Err(e)
            }
        };

        match result {
            Ok((copy, folders)) => {
                info!(
                    user = %ctx.actor(),
                    folder_id = %folder_id,
                    copy_id = %copy.id,
                    project_id = %new_project,
                    folders,
                    blobs = copied_blobs.len(),
                    "Folder copied"
                );
                Ok(copy)
            }
            Err(e) => {
                purge::remove_blobs(self.storage.as_ref(), &copied_blobs).await;
                warn!(user = %ctx.actor(), folder_id = %folder_id, error = %e, "Folder copy failed");
                Err(e)
            }
        }
    }

    async fn copy_subtree(
        &self,
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_project: ProjectId,
        new_parent: Option<FolderId>,
        copied_blobs: &mut Vec<String>,
    ) -> AppResult<(Folder, usize)> {
        let folder = FolderRepository::get(conn, folder_id).await?;

        let mut source = Scope::load(conn, ctx, folder.project_id).await?;
        source.require(Capability::ViewDmsfFolders)?;
        source.require_live(folder_id)?;

        let mut target = Scope::load(conn, ctx, new_project).await?;
        target.require(Capability::FolderManipulation)?;
        self.check_destination(conn, &mut target, folder_id, new_project, new_parent)
            .await?;

        if FolderRepository::title_taken(conn, new_project, new_parent, &folder.title, None).await? {
            return Err(AppError::conflict(format!("Folder '{}' already exists", folder.title)));
        }

        let user = ctx.user_id();
        let mut queue = VecDeque::from([Pending {
            source: folder,
            parent: new_parent,
        }]);
        let mut root_copy = None;
        let mut folders = 0usize;

        while let Some(Pending { source: src, parent }) = queue.pop_front() {
            let copy = FolderRepository::create(
                conn,
                &CreateFolder {
                    project_id: new_project,
                    parent_id: parent,
                    title: src.title.clone(),
                    description: src.description.clone(),
                    position: src.position,
                },
                user,
            )
            .await?;
            FolderPermissionRepository::copy_entries(conn, src.id, copy.id).await?;
            CustomFieldRepository::copy_values(conn, src.id, copy.id).await?;
            self.copy_content(conn, &src, &copy, user, copied_blobs).await?;
            folders += 1;

            for child in FolderRepository::children(conn, src.project_id, Some(src.id)).await? {
                if child.is_deleted() || !source.acl.is_visible(child.id) {
                    continue;
                }
                queue.push_back(Pending {
                    source: child,
                    parent: Some(copy.id),
                });
            }

            debug!(source_id = %src.id, copy_id = %copy.id, "Copied folder");
            root_copy.get_or_insert(copy);
        }

        let copy = root_copy.ok_or_else(|| AppError::internal("Folder copy produced nothing"))?;
        Ok((copy, folders))
    }

    /// Copies active files and links of one folder.
    async fn copy_content(
        &self,
        conn: &mut SqliteConnection,
        src: &Folder,
        copy: &Folder,
        user: Option<UserId>,
        copied_blobs: &mut Vec<String>,
    ) -> AppResult<()> {
        for file in FileRepository::list_in_folder(conn, src.project_id, Some(src.id)).await? {
            if file.is_deleted() {
                continue;
            }
            let new_file = FileRepository::create(
                conn,
                &CreateFile {
                    project_id: copy.project_id,
                    folder_id: Some(copy.id),
                    name: file.name.clone(),
                },
            )
            .await?;

            if let Some(revision) = FileRepository::latest_revision(conn, file.id).await? {
                let new_revision = FileRepository::copy_revision(conn, &revision, new_file.id, user).await?;
                self.storage
                    .copy(&revision.disk_filename, &new_revision.disk_filename)
                    .await?;
                copied_blobs.push(new_revision.disk_filename);
            }
        }

        for link in LinkRepository::list_in_folder(conn, src.project_id, Some(src.id)).await? {
            if link.is_deleted() {
                continue;
            }
            LinkRepository::create(
                conn,
                &CreateLink {
                    project_id: copy.project_id,
                    folder_id: Some(copy.id),
                    name: link.name.clone(),
                    target_type: link.target_type,
                    target_id: link.target_id,
                    target_project_id: link.target_project_id,
                },
            )
            .await?;
        }
        Ok(())
    }
}
