//! Link repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FolderId, LinkId, ProjectId, UserId};
use dms_entity::link::{CreateLink, Link, LinkTargetType};
use dms_entity::status::EntryStatus;

use super::db_err;

/// Repository for links to folders and files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkRepository;

impl LinkRepository {
    /// Find a link by ID.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: LinkId) -> AppResult<Option<Link>> {
        sqlx::query_as::<_, Link>("SELECT * FROM links WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find link"))
    }

    /// Find a link by ID or fail with not-found.
    pub async fn get(conn: &mut SqliteConnection, id: LinkId) -> AppResult<Link> {
        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Link {id} not found")))
    }

    /// Links placed directly inside a folder (`None` for the project root), any status.
    pub async fn list_in_folder(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<Link>> {
        sqlx::query_as::<_, Link>(
            "SELECT * FROM links WHERE project_id = ? AND folder_id IS ? ORDER BY name COLLATE NOCASE",
        )
        .bind(project_id)
        .bind(folder_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list links"))
    }

    /// Deleted links of a project.
    pub async fn list_deleted(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
    ) -> AppResult<Vec<Link>> {
        sqlx::query_as::<_, Link>(
            "SELECT * FROM links WHERE project_id = ? AND status = 'deleted' ORDER BY updated_at DESC",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list deleted links"))
    }

    /// Links pointing at a folder or file.
    pub async fn list_by_target(
        conn: &mut SqliteConnection,
        target_type: LinkTargetType,
        target_id: Uuid,
    ) -> AppResult<Vec<Link>> {
        sqlx::query_as::<_, Link>("SELECT * FROM links WHERE target_type = ? AND target_id = ?")
            .bind(target_type)
            .bind(target_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list links by target"))
    }

    /// Insert a link.
    pub async fn create(conn: &mut SqliteConnection, data: &CreateLink) -> AppResult<Link> {
        let now = Utc::now();
        sqlx::query_as::<_, Link>(
            "INSERT INTO links (id, project_id, folder_id, name, target_type, target_id, \
             target_project_id, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?, ?) RETURNING *",
        )
        .bind(LinkId::new())
        .bind(data.project_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(data.target_type)
        .bind(data.target_id)
        .bind(data.target_project_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create link"))
    }

    /// Set the lifecycle status.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: LinkId,
        status: EntryStatus,
        deleted_by: Option<UserId>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE links SET status = ?, deleted_by = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(deleted_by)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to update link status"))?;
        Ok(())
    }

    /// Remove a link row.
    pub async fn delete(conn: &mut SqliteConnection, id: LinkId) -> AppResult<()> {
        sqlx::query("DELETE FROM links WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete link"))?;
        Ok(())
    }
}
