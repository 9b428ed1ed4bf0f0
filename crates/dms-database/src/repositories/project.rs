//! Project repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{ProjectId, RoleId};
use dms_entity::project::{CreateProject, Project};

use super::db_err;

/// Repository for projects and their document-module settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectRepository;

impl ProjectRepository {
    /// Find a project by ID.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: ProjectId) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find project"))
    }

    /// Find a project by ID or fail with not-found.
    pub async fn get(conn: &mut SqliteConnection, id: ProjectId) -> AppResult<Project> {
        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))
    }

    /// Find a project by its short identifier.
    pub async fn find_by_identifier(
        conn: &mut SqliteConnection,
        identifier: &str,
    ) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE identifier = ?")
            .bind(identifier)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find project by identifier"))
    }

    /// Create a new project.
    pub async fn create(conn: &mut SqliteConnection, data: &CreateProject) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, identifier, name, dms_enabled, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(ProjectId::new())
        .bind(&data.identifier)
        .bind(&data.name)
        .bind(data.dms_enabled)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref dbe) if dbe.is_unique_violation() => {
                AppError::conflict(format!("Project '{}' already exists", data.identifier))
            }
            other => AppError::from(other),
        })
    }

    /// Enable or disable the document module.
    pub async fn set_dms_enabled(
        conn: &mut SqliteConnection,
        id: ProjectId,
        enabled: bool,
    ) -> AppResult<()> {
        sqlx::query("UPDATE projects SET dms_enabled = ? WHERE id = ?")
            .bind(enabled)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to update project module"))?;
        Ok(())
    }

    /// Set the role applied to anonymous requests (the anonymous default member).
    pub async fn set_anonymous_role(
        conn: &mut SqliteConnection,
        id: ProjectId,
        role_id: Option<RoleId>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE projects SET anonymous_role_id = ? WHERE id = ?")
            .bind(role_id)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to set anonymous role"))?;
        Ok(())
    }

    /// Set the role applied to logged-in non-members.
    pub async fn set_non_member_role(
        conn: &mut SqliteConnection,
        id: ProjectId,
        role_id: Option<RoleId>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE projects SET non_member_role_id = ? WHERE id = ?")
            .bind(role_id)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to set non-member role"))?;
        Ok(())
    }
}
