//! Users, roles and memberships.

use chrono::Utc;
use sqlx::SqliteConnection;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{MemberId, ProjectId, RoleId, UserId};
use dms_entity::user::{Capability, Member, Role, User};

use super::db_err;

/// Repository for users, roles, role capabilities and project members.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Find a user by ID.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find user"))
    }

    /// Find a user by login.
    pub async fn find_by_login(conn: &mut SqliteConnection, login: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find user by login"))
    }

    /// Create a user.
    pub async fn create_user(
        conn: &mut SqliteConnection,
        login: &str,
        firstname: &str,
        lastname: &str,
        mail: Option<&str>,
        admin: bool,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, login, firstname, lastname, mail, admin, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(UserId::new())
        .bind(login)
        .bind(firstname)
        .bind(lastname)
        .bind(mail)
        .bind(admin)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref dbe) if dbe.is_unique_violation() => {
                AppError::conflict(format!("User '{login}' already exists"))
            }
            other => AppError::from(other),
        })
    }

    /// Create a role with its capabilities.
    pub async fn create_role(
        conn: &mut SqliteConnection,
        name: &str,
        position: i64,
        capabilities: &[Capability],
    ) -> AppResult<Role> {
        let mut role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, name, position) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(RoleId::new())
        .bind(name)
        .bind(position)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create role"))?;

        for capability in capabilities {
            Self::add_capability(conn, role.id, *capability).await?;
        }
        role.capabilities = capabilities.to_vec();
        Ok(role)
    }

    /// Find a role by ID, with capabilities loaded.
    pub async fn find_role(conn: &mut SqliteConnection, id: RoleId) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find role"))?;

        match role {
            Some(mut role) => {
                role.capabilities = Self::capabilities_of(conn, role.id).await?;
                Ok(Some(role))
            }
            None => Ok(None),
        }
    }

    /// Capabilities granted by a role.
    pub async fn capabilities_of(
        conn: &mut SqliteConnection,
        role_id: RoleId,
    ) -> AppResult<Vec<Capability>> {
        sqlx::query_scalar::<_, Capability>(
            "SELECT capability FROM role_capabilities WHERE role_id = ? ORDER BY capability",
        )
        .bind(role_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to load role capabilities"))
    }

    /// Grant a capability to a role. Granting twice is a no-op.
    pub async fn add_capability(
        conn: &mut SqliteConnection,
        role_id: RoleId,
        capability: Capability,
    ) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO role_capabilities (role_id, capability) VALUES (?, ?)")
            .bind(role_id)
            .bind(capability)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to grant capability"))?;
        Ok(())
    }

    /// Withdraw a capability from a role.
    pub async fn remove_capability(
        conn: &mut SqliteConnection,
        role_id: RoleId,
        capability: Capability,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM role_capabilities WHERE role_id = ? AND capability = ?")
            .bind(role_id)
            .bind(capability)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to withdraw capability"))?;
        Ok(())
    }

    /// Assign a role to a user in a project.
    pub async fn add_member(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            "INSERT INTO members (id, project_id, user_id, role_id) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(MemberId::new())
        .bind(project_id)
        .bind(user_id)
        .bind(role_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to add member"))
    }

    /// Role ids a user holds as a member of a project.
    pub async fn member_role_ids(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Vec<RoleId>> {
        sqlx::query_scalar::<_, RoleId>(
            "SELECT role_id FROM members WHERE project_id = ? AND user_id = ?",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to load member roles"))
    }

    /// Users with at least one role in the project.
    pub async fn project_members(
        conn: &mut SqliteConnection,
        project_id: ProjectId,
    ) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT DISTINCT u.* FROM users u INNER JOIN members m ON m.user_id = u.id \
             WHERE m.project_id = ? ORDER BY u.login",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list project members"))
    }
}
