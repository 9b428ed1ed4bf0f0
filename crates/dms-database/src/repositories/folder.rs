//! Folder repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FolderId, ProjectId, UserId};
use dms_entity::folder::{CreateFolder, Folder};
use dms_entity::status::EntryStatus;

use super::db_err;

/// Upper bound on hierarchy depth followed by recursive queries.
pub const MAX_DEPTH: i64 = 1000;

/// Repository for folder rows and hierarchy queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderRepository;

impl FolderRepository {
    /// Find a folder by ID, regardless of status.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find folder"))
    }

    /// Find a folder by ID or fail with not-found.
    pub async fn get(conn: &mut SqliteConnection, id: FolderId) -> AppResult<Folder> {
        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// All folders of a project, any status, in display order.
    pub async fn list_by_project(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE project_id = ? ORDER BY position, title COLLATE NOCASE",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list folders"))
    }

    /// Deleted folders of a project.
    pub async fn list_deleted(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE project_id = ? AND status = 'deleted' \
             ORDER BY updated_at DESC",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list deleted folders"))
    }

    /// Direct subfolders, any status. `None` lists the project roots.
    pub async fn children(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE project_id = ? AND parent_id IS ? \
             ORDER BY position, title COLLATE NOCASE",
        )
        .bind(project_id)
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list subfolders"))
    }

    /// The folder followed by its ancestors, nearest first.
    pub async fn ancestors_and_self(
        conn: &mut SqliteConnection,
        id: FolderId,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "WITH RECURSIVE chain(id, parent_id, depth) AS ( \
                 SELECT id, parent_id, 0 FROM folders WHERE id = ? \
                 UNION ALL \
                 SELECT f.id, f.parent_id, chain.depth + 1 \
                 FROM folders f JOIN chain ON f.id = chain.parent_id \
                 WHERE chain.depth < ? \
             ) \
             SELECT f.* FROM folders f JOIN chain ON f.id = chain.id ORDER BY chain.depth",
        )
        .bind(id)
        .bind(MAX_DEPTH)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to load folder ancestors"))
    }

    /// The folder and every descendant, any status, shallowest first.
    pub async fn subtree(conn: &mut SqliteConnection, id: FolderId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "WITH RECURSIVE sub(id, depth) AS ( \
                 SELECT id, 0 FROM folders WHERE id = ? \
                 UNION ALL \
                 SELECT f.id, sub.depth + 1 FROM folders f JOIN sub ON f.parent_id = sub.id \
                 WHERE sub.depth < ? \
             ) \
             SELECT f.* FROM folders f JOIN sub ON f.id = sub.id \
             ORDER BY sub.depth, f.position, f.title COLLATE NOCASE",
        )
        .bind(id)
        .bind(MAX_DEPTH)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to load folder subtree"))
    }

    /// Whether an active sibling already uses the title.
    pub async fn title_taken(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        parent_id: Option<FolderId>,
        title: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM folders \
             WHERE project_id = ? AND parent_id IS ? AND title = ? AND status = 'active' \
             AND id IS NOT ?",
        )
        .bind(project_id)
        .bind(parent_id)
        .bind(title)
        .bind(exclude)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to check sibling titles"))?;
        Ok(count > 0)
    }

    /// Whether the folder holds any undeleted subfolder, file or link.
    pub async fn has_active_content(conn: &mut SqliteConnection, id: FolderId) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM folders WHERE parent_id = ?1 AND status = 'active') \
                  + (SELECT COUNT(*) FROM files WHERE folder_id = ?1 AND status = 'active') \
                  + (SELECT COUNT(*) FROM links WHERE folder_id = ?1 AND status = 'active')",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to inspect folder content"))?;
        Ok(count > 0)
    }

    /// Insert a folder.
    pub async fn create(
        conn: &mut SqliteConnection,
        data: &CreateFolder,
        created_by: Option<UserId>,
    ) -> AppResult<Folder> {
        let now = Utc::now();
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, project_id, parent_id, title, description, position, \
             status, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 'active', ?, ?, ?) RETURNING *",
        )
        .bind(FolderId::new())
        .bind(data.project_id)
        .bind(data.parent_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.position)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create folder"))
    }

    /// Update title and description.
    pub async fn update_details(
        conn: &mut SqliteConnection,
        id: FolderId,
        title: &str,
        description: &str,
    ) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET title = ?, description = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(title)
        .bind(description)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to update folder"))
    }

    /// Set the lifecycle status. `deleted_by` is cleared on restore.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: FolderId,
        status: EntryStatus,
        deleted_by: Option<UserId>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE folders SET status = ?, deleted_by = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(deleted_by)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to update folder status"))?;
        Ok(())
    }

    /// Re-parent a folder.
    pub async fn set_parent(
        conn: &mut SqliteConnection,
        id: FolderId,
        parent_id: Option<FolderId>,
        project_id: ProjectId,
    ) -> AppResult<()> {
        sqlx::query("UPDATE folders SET parent_id = ?, project_id = ?, updated_at = ? WHERE id = ?")
            .bind(parent_id)
            .bind(project_id)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to move folder"))?;
        Ok(())
    }

    /// Reassign the project of a folder subtree and everything inside it,
    /// and retarget links that point into the subtree.
    pub async fn reassign_subtree_project(
        conn: &mut SqliteConnection,
        id: FolderId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        const SUBTREE: &str = "WITH RECURSIVE sub(id, depth) AS ( \
                 SELECT id, 0 FROM folders WHERE id = ? \
                 UNION ALL \
                 SELECT f.id, sub.depth + 1 FROM folders f JOIN sub ON f.parent_id = sub.id \
                 WHERE sub.depth < ? \
             ) ";

        for table in ["files", "links"] {
            sqlx::query(&format!(
                "{SUBTREE} UPDATE {table} SET project_id = ? WHERE folder_id IN (SELECT id FROM sub)"
            ))
            .bind(id)
            .bind(MAX_DEPTH)
            .bind(project_id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to reassign project of folder content"))?;
        }

        sqlx::query(&format!(
            "{SUBTREE} UPDATE folders SET project_id = ? WHERE id IN (SELECT id FROM sub)"
        ))
        .bind(id)
        .bind(MAX_DEPTH)
        .bind(project_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to reassign project of folders"))?;

        // Links elsewhere keep pointing at the moved entries.
        sqlx::query(&format!(
            "{SUBTREE} UPDATE links SET target_project_id = ? \
             WHERE (target_type = 'folder' AND target_id IN (SELECT id FROM sub)) \
             OR (target_type = 'file' AND target_id IN \
                 (SELECT id FROM files WHERE folder_id IN (SELECT id FROM sub)))"
        ))
        .bind(id)
        .bind(MAX_DEPTH)
        .bind(project_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to update link targets"))?;
        Ok(())
    }

    /// Remove the folder row. Dependent rows must be removed first.
    pub async fn delete(conn: &mut SqliteConnection, id: FolderId) -> AppResult<()> {
        sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete folder"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabasePool;
    use crate::repositories::ProjectRepository;
    use dms_entity::project::CreateProject;

    async fn project(conn: &mut SqliteConnection) -> ProjectId {
        ProjectRepository::create(
            conn,
            &CreateProject {
                identifier: "demo".to_string(),
                name: "Demo".to_string(),
                dms_enabled: true,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn folder(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        parent_id: Option<FolderId>,
        title: &str,
    ) -> Folder {
        FolderRepository::create(
            conn,
            &CreateFolder {
                project_id,
                parent_id,
                title: title.to_string(),
                description: String::new(),
                position: 0,
            },
            None,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_ancestors_nearest_first() {
        let db = DatabasePool::in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let p = project(&mut conn).await;
        let a = folder(&mut conn, p, None, "a").await;
        let b = folder(&mut conn, p, Some(a.id), "b").await;
        let c = folder(&mut conn, p, Some(b.id), "c").await;

        let chain = FolderRepository::ancestors_and_self(&mut conn, c.id).await.unwrap();
        let ids: Vec<FolderId> = chain.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_subtree_and_title_check() {
        let db = DatabasePool::in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let p = project(&mut conn).await;
        let a = folder(&mut conn, p, None, "a").await;
        let b = folder(&mut conn, p, Some(a.id), "b").await;
        folder(&mut conn, p, Some(b.id), "c").await;
        folder(&mut conn, p, None, "other").await;

        let sub = FolderRepository::subtree(&mut conn, a.id).await.unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub[0].id, a.id);

        assert!(FolderRepository::title_taken(&mut conn, p, None, "a", None).await.unwrap());
        assert!(!FolderRepository::title_taken(&mut conn, p, None, "a", Some(a.id)).await.unwrap());
        assert!(!FolderRepository::title_taken(&mut conn, p, Some(a.id), "a", None).await.unwrap());

        FolderRepository::set_status(&mut conn, b.id, EntryStatus::Deleted, None)
            .await
            .unwrap();
        assert!(!FolderRepository::has_active_content(&mut conn, a.id).await.unwrap());
    }
}
