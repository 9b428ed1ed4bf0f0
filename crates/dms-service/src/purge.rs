//! Permanent removal of folders, files and links.
//!
//! Purge helpers only touch rows. They return the blob keys to delete,
//! which the caller removes after the transaction commits.

use sqlx::SqliteConnection;
use tracing::{debug, warn};

use dms_core::result::AppResult;
use dms_core::traits::StorageProvider;
use dms_core::types::{FileId, FolderId};
use dms_database::repositories::{
    CustomFieldRepository, FileRepository, FolderPermissionRepository, FolderRepository,
    LinkRepository,
};
use dms_entity::link::LinkTargetType;

/// Remove a folder, its descendants and everything inside them.
pub(crate) async fn purge_folder(
    conn: &mut SqliteConnection,
    folder_id: FolderId,
) -> AppResult<Vec<String>> {
    let subtree = FolderRepository::subtree(conn, folder_id).await?;
    let mut blobs = Vec::new();

    // Deepest folders first so no row outlives its parent.
    for folder in subtree.iter().rev() {
        for file in FileRepository::list_in_folder(conn, folder.project_id, Some(folder.id)).await? {
            blobs.extend(purge_file(conn, file.id).await?);
        }
        for link in LinkRepository::list_in_folder(conn, folder.project_id, Some(folder.id)).await? {
            LinkRepository::delete(conn, link.id).await?;
        }
        for link in
            LinkRepository::list_by_target(conn, LinkTargetType::Folder, folder.id.into_uuid()).await?
        {
            LinkRepository::delete(conn, link.id).await?;
        }
        CustomFieldRepository::delete_for_folder(conn, folder.id).await?;
        FolderPermissionRepository::delete_for_folder(conn, folder.id).await?;
        FolderRepository::delete(conn, folder.id).await?;
        debug!(folder_id = %folder.id, "Purged folder row");
    }

    Ok(blobs)
}

/// Remove a file with its revisions and the links pointing at it.
pub(crate) async fn purge_file(conn: &mut SqliteConnection, file_id: FileId) -> AppResult<Vec<String>> {
    let blobs = FileRepository::revisions(conn, file_id)
        .await?
        .into_iter()
        .map(|r| r.disk_filename)
        .collect();

    for link in LinkRepository::list_by_target(conn, LinkTargetType::File, file_id.into_uuid()).await? {
        LinkRepository::delete(conn, link.id).await?;
    }
    FileRepository::delete_revisions(conn, file_id).await?;
    FileRepository::delete(conn, file_id).await?;
    Ok(blobs)
}

/// Delete blobs whose rows are gone. Failures are logged, not returned.
pub(crate) async fn remove_blobs(storage: &dyn StorageProvider, blobs: &[String]) {
    for key in blobs {
        if let Err(e) = storage.delete(key).await {
            warn!(key = %key, error = %e, "Failed to delete blob");
        }
    }
}
