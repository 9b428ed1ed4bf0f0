//! Folder permission repository implementation.

use sqlx::SqliteConnection;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FolderId, FolderPermissionId, ProjectId};
use dms_entity::permission::{FolderPermission, PrincipalRef};

use super::db_err;

/// Repository for per-folder permission entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderPermissionRepository;

impl FolderPermissionRepository {
    /// Entries attached directly to a folder.
    pub async fn list_for_folder(
        conn: &mut SqliteConnection,
        folder_id: FolderId,
    ) -> AppResult<Vec<FolderPermission>> {
        sqlx::query_as::<_, FolderPermission>(
            "SELECT * FROM folder_permissions WHERE folder_id = ? ORDER BY principal_type",
        )
        .bind(folder_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list folder permissions"))
    }

    /// Entries of every folder in a project.
    pub async fn list_for_project(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
    ) -> AppResult<Vec<FolderPermission>> {
        sqlx::query_as::<_, FolderPermission>(
            "SELECT p.* FROM folder_permissions p \
             INNER JOIN folders f ON f.id = p.folder_id WHERE f.project_id = ?",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list project folder permissions"))
    }

    /// Add an entry. Granting the same principal twice is a no-op.
    pub async fn grant(
        conn: &mut SqliteConnection,
        folder_id: FolderId,
        principal: PrincipalRef,
    ) -> AppResult<FolderPermission> {
        let (principal_type, principal_id) = principal.into_parts();
        sqlx::query(
            "INSERT OR IGNORE INTO folder_permissions (id, folder_id, principal_type, principal_id) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(FolderPermissionId::new())
        .bind(folder_id)
        .bind(principal_type)
        .bind(principal_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to grant folder permission"))?;

        sqlx::query_as::<_, FolderPermission>(
            "SELECT * FROM folder_permissions \
             WHERE folder_id = ? AND principal_type = ? AND principal_id = ?",
        )
        .bind(folder_id)
        .bind(principal_type)
        .bind(principal_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to load folder permission"))?
        .ok_or_else(|| AppError::internal("Granted folder permission vanished"))
    }

    /// Remove an entry. Returns whether anything was removed.
    pub async fn revoke(
        conn: &mut SqliteConnection,
        folder_id: FolderId,
        principal: PrincipalRef,
    ) -> AppResult<bool> {
        let (principal_type, principal_id) = principal.into_parts();
        let result = sqlx::query(
            "DELETE FROM folder_permissions \
             WHERE folder_id = ? AND principal_type = ? AND principal_id = ?",
        )
        .bind(folder_id)
        .bind(principal_type)
        .bind(principal_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to revoke folder permission"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Copy every entry of one folder onto another.
    pub async fn copy_entries(
        conn: &mut SqliteConnection,
        from: FolderId,
        to: FolderId,
    ) -> AppResult<()> {
        for entry in Self::list_for_folder(conn, from).await? {
            Self::grant(conn, to, entry.principal()).await?;
        }
        Ok(())
    }

    /// Remove every entry attached to a folder.
    pub async fn delete_for_folder(conn: &mut SqliteConnection, folder_id: FolderId) -> AppResult<()> {
        sqlx::query("DELETE FROM folder_permissions WHERE folder_id = ?")
            .bind(folder_id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete folder permissions"))?;
        Ok(())
    }
}
