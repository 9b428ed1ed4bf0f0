//! File and revision repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FileId, FolderId, ProjectId, RevisionId, UserId};
use dms_entity::file::{CreateFile, File, Revision};
use dms_entity::status::EntryStatus;

use super::db_err;

/// Repository for files and their revisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRepository;

impl FileRepository {
    /// Find a file by ID.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find file"))
    }

    /// Find a file by ID or fail with not-found.
    pub async fn get(conn: &mut SqliteConnection, id: FileId) -> AppResult<File> {
        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Files directly inside a folder (`None` for the project root), any status.
    pub async fn list_in_folder(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE project_id = ? AND folder_id IS ? ORDER BY name COLLATE NOCASE",
        )
        .bind(project_id)
        .bind(folder_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list files"))
    }

    /// Deleted files of a project.
    pub async fn list_deleted(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE project_id = ? AND status = 'deleted' ORDER BY updated_at DESC",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list deleted files"))
    }

    /// Whether an active file in the same folder already uses the name.
    pub async fn name_taken(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
        name: &str,
    ) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files \
             WHERE project_id = ? AND folder_id IS ? AND name = ? AND status = 'active'",
        )
        .bind(project_id)
        .bind(folder_id)
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to check file names"))?;
        Ok(count > 0)
    }

    /// Insert a file row.
    pub async fn create(conn: &mut SqliteConnection, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        sqlx::query_as::<_, File>(
            "INSERT INTO files (id, project_id, folder_id, name, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 'active', ?, ?) RETURNING *",
        )
        .bind(FileId::new())
        .bind(data.project_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create file"))
    }

    /// Set the lifecycle status.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: FileId,
        status: EntryStatus,
        deleted_by: Option<UserId>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE files SET status = ?, deleted_by = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(deleted_by)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to update file status"))?;
        Ok(())
    }

    /// Remove a file row. Revisions must be removed first.
    pub async fn delete(conn: &mut SqliteConnection, id: FileId) -> AppResult<()> {
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete file"))?;
        Ok(())
    }

    /// Append a revision. The revision number is one past the current maximum.
    pub async fn add_revision(
        conn: &mut SqliteConnection,
        file_id: FileId,
        title: &str,
        size_bytes: i64,
        mime_type: Option<&str>,
        created_by: Option<UserId>,
    ) -> AppResult<Revision> {
        let id = RevisionId::new();
        sqlx::query_as::<_, Revision>(
            "INSERT INTO revisions (id, file_id, revision_no, title, disk_filename, size_bytes, \
             mime_type, created_by, created_at) \
             VALUES (?, ?, (SELECT COALESCE(MAX(revision_no), 0) + 1 FROM revisions WHERE file_id = ?), \
             ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(id)
        .bind(file_id)
        .bind(file_id)
        .bind(title)
        .bind(Revision::storage_key(id))
        .bind(size_bytes)
        .bind(mime_type)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create revision"))
    }

    /// The newest revision of a file.
    pub async fn latest_revision(
        conn: &mut SqliteConnection,
        file_id: FileId,
    ) -> AppResult<Option<Revision>> {
        sqlx::query_as::<_, Revision>(
            "SELECT * FROM revisions WHERE file_id = ? ORDER BY revision_no DESC LIMIT 1",
        )
        .bind(file_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to load latest revision"))
    }

    /// Every revision of a file, oldest first.
    pub async fn revisions(conn: &mut SqliteConnection, file_id: FileId) -> AppResult<Vec<Revision>> {
        sqlx::query_as::<_, Revision>(
            "SELECT * FROM revisions WHERE file_id = ? ORDER BY revision_no",
        )
        .bind(file_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list revisions"))
    }

    /// Insert a revision copied from another file with a fresh blob key.
    pub async fn copy_revision(
        conn: &mut SqliteConnection,
        source: &Revision,
        file_id: FileId,
        created_by: Option<UserId>,
    ) -> AppResult<Revision> {
        let id = RevisionId::new();
        sqlx::query_as::<_, Revision>(
            "INSERT INTO revisions (id, file_id, revision_no, title, disk_filename, size_bytes, \
             mime_type, created_by, created_at) VALUES (?, ?, 1, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(id)
        .bind(file_id)
        .bind(&source.title)
        .bind(Revision::storage_key(id))
        .bind(source.size_bytes)
        .bind(&source.mime_type)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to copy revision"))
    }

    /// Remove every revision row of a file.
    pub async fn delete_revisions(conn: &mut SqliteConnection, file_id: FileId) -> AppResult<()> {
        sqlx::query("DELETE FROM revisions WHERE file_id = ?")
            .bind(file_id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete revisions"))?;
        Ok(())
    }
}
