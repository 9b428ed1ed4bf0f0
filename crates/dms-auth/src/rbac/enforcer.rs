//! RBAC enforcement: which capabilities a principal holds in a project.

use sqlx::SqliteConnection;
use tracing::debug;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{ProjectId, RoleId};
use dms_database::repositories::{ProjectRepository, UserRepository};
use dms_entity::project::Project;
use dms_entity::user::{Capability, Role};

use crate::principal::Principal;

/// The capabilities a principal holds in one project, resolved once per request.
#[derive(Debug, Clone)]
pub struct ProjectAccess {
    project_id: ProjectId,
    principal: Principal,
    module_enabled: bool,
    roles: Vec<Role>,
}

impl ProjectAccess {
    /// Build the access view from already loaded roles.
    pub fn new(project: &Project, principal: Principal, roles: Vec<Role>) -> Self {
        Self {
            project_id: project.id,
            principal,
            module_enabled: project.dms_enabled,
            roles,
        }
    }

    /// The project this access applies to.
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// The acting principal.
    pub fn principal(&self) -> Principal {
        self.principal
    }

    /// Roles effective for the principal in this project.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// IDs of the effective roles.
    pub fn role_ids(&self) -> Vec<RoleId> {
        self.roles.iter().map(|r| r.id).collect()
    }

    /// Whether the document module is enabled for the project.
    pub fn module_enabled(&self) -> bool {
        self.module_enabled
    }

    /// Whether folder permission entries are ignored for this principal.
    pub fn bypasses_folder_permissions(&self) -> bool {
        self.principal.bypasses_checks()
    }

    /// Whether the principal may use the capability in this project.
    ///
    /// A disabled document module denies everything, even to administrators.
    pub fn allowed_to(&self, capability: Capability) -> bool {
        if !self.module_enabled {
            return false;
        }
        self.principal.bypasses_checks() || self.roles.iter().any(|r| r.allows(capability))
    }

    /// Fail with an authorization error unless the capability is held.
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.allowed_to(capability) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Permission '{capability}' is required in project {}",
                self.project_id
            )))
        }
    }

    /// Fail unless every listed capability is held.
    pub fn require_all(&self, capabilities: &[Capability]) -> AppResult<()> {
        capabilities.iter().try_for_each(|c| self.require(*c))
    }
}

/// Resolves effective project roles from memberships and project defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Load the project and the principal's roles in it.
    pub async fn project_access(
        conn: &mut SqliteConnection,
        principal: Principal,
        project_id: ProjectId,
    ) -> AppResult<ProjectAccess> {
        let project = ProjectRepository::get(conn, project_id).await?;
        let roles = Self::roles_for_project(conn, principal, &project).await?;
        debug!(
            project_id = %project.id,
            principal = %principal.label(),
            roles = roles.len(),
            "Resolved project roles"
        );
        Ok(ProjectAccess::new(&project, principal, roles))
    }

    /// Roles effective for the principal in the project.
    ///
    /// Members get their member roles. Logged-in non-members get the
    /// project's non-member role and anonymous visitors its anonymous
    /// role, when configured. The system principal holds no roles.
    pub async fn roles_for_project(
        conn: &mut SqliteConnection,
        principal: Principal,
        project: &Project,
    ) -> AppResult<Vec<Role>> {
        let role_ids = match principal {
            Principal::User { id, .. } => {
                let member_roles = UserRepository::member_role_ids(conn, project.id, id).await?;
                if member_roles.is_empty() {
                    project.non_member_role_id.into_iter().collect()
                } else {
                    member_roles
                }
            }
            Principal::Anonymous => project.anonymous_role_id.into_iter().collect(),
            Principal::System => Vec::new(),
        };

        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            if let Some(role) = UserRepository::find_role(conn, role_id).await? {
                roles.push(role);
            }
        }
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dms_core::error::ErrorKind;
    use dms_core::types::UserId;

    fn project(enabled: bool) -> Project {
        Project {
            id: ProjectId::new(),
            identifier: "p".to_string(),
            name: "P".to_string(),
            dms_enabled: enabled,
            non_member_role_id: None,
            anonymous_role_id: None,
            created_at: Utc::now(),
        }
    }

    fn role(capabilities: Vec<Capability>) -> Role {
        Role {
            id: RoleId::new(),
            name: "Developer".to_string(),
            position: 1,
            capabilities,
        }
    }

    #[test]
    fn test_role_capabilities() {
        let user = Principal::User { id: UserId::new(), admin: false };
        let access = ProjectAccess::new(
            &project(true),
            user,
            vec![role(vec![Capability::ViewDmsfFolders])],
        );
        assert!(access.allowed_to(Capability::ViewDmsfFolders));
        assert!(!access.allowed_to(Capability::FolderManipulation));
        let err = access.require(Capability::FolderManipulation).unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
    }

    #[test]
    fn test_admin_bypass_but_module_gate() {
        let admin = Principal::User { id: UserId::new(), admin: true };
        assert!(ProjectAccess::new(&project(true), admin, vec![]).allowed_to(Capability::FileDelete));
        assert!(!ProjectAccess::new(&project(false), admin, vec![]).allowed_to(Capability::FileDelete));
        assert!(!ProjectAccess::new(&project(false), Principal::System, vec![])
            .allowed_to(Capability::ViewDmsfFolders));
    }
}
