//! Capability and folder permission checks for one project and one request.

use sqlx::SqliteConnection;

use dms_auth::{PermissionEvaluator, ProjectAccess, RbacEnforcer};
use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FolderId, ProjectId};
use dms_entity::user::Capability;

use crate::context::RequestContext;

/// Project capabilities plus the folder permission evaluator of a principal.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub access: ProjectAccess,
    pub acl: PermissionEvaluator,
}

impl Scope {
    pub async fn load(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> AppResult<Self> {
        let access = RbacEnforcer::project_access(conn, ctx.principal, project_id).await?;
        let acl = PermissionEvaluator::load(conn, &access).await?;
        Ok(Self { access, acl })
    }

    pub fn require(&self, capability: Capability) -> AppResult<()> {
        self.access.require(capability)
    }

    pub fn allowed_to(&self, capability: Capability) -> bool {
        self.access.allowed_to(capability)
    }

    /// The folder's permission entries must admit the principal.
    pub fn require_permitted(&mut self, folder_id: FolderId) -> AppResult<()> {
        if self.acl.permits(folder_id) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "You are not permitted to access folder {folder_id}"
            )))
        }
    }

    /// The folder must be outside the trash and permitted.
    pub fn require_live(&mut self, folder_id: FolderId) -> AppResult<()> {
        if self.acl.in_trash(folder_id) {
            return Err(AppError::validation(format!("Folder {folder_id} is deleted")));
        }
        self.require_permitted(folder_id)
    }

    /// A container folder (`None` for the project root) must accept new content.
    pub fn require_container(&mut self, folder_id: Option<FolderId>) -> AppResult<()> {
        match folder_id {
            Some(id) => self.require_live(id),
            None => Ok(()),
        }
    }
}
