//! Folder permission management: grant, revoke and inspect entries.

use std::sync::Arc;

use tracing::info;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FolderId, RoleId};
use dms_database::DatabasePool;
use dms_database::repositories::{FolderPermissionRepository, FolderRepository, UserRepository};
use dms_entity::permission::{FolderPermission, PrincipalRef};
use dms_entity::user::{Capability, User};

use crate::context::RequestContext;
use crate::scope::Scope;

/// Manages the permission entries attached to folders.
#[derive(Debug, Clone)]
pub struct PermissionService {
    /// Database pool.
    db: Arc<DatabasePool>,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(db: Arc<DatabasePool>) -> Self {
        Self { db }
    }

    /// Entries attached directly to a folder.
    pub async fn entries(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Vec<FolderPermission>> {
        let mut conn = self.db.acquire().await?;
        let folder = FolderRepository::get(&mut conn, folder_id).await?;
        let scope = Scope::load(&mut conn, ctx, folder.project_id).await?;
        scope.require(Capability::ViewDmsfFolders)?;
        FolderPermissionRepository::list_for_folder(&mut conn, folder_id).await
    }

    /// Adds an entry for a user or role on a folder.
    pub async fn grant(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        principal: PrincipalRef,
    ) -> AppResult<FolderPermission> {
        let mut tx = self.db.begin().await?;
        let folder = FolderRepository::get(&mut tx, folder_id).await?;
        let mut scope = Scope::load(&mut tx, ctx, folder.project_id).await?;
        scope.require(Capability::ManageFolderPermissions)?;
        scope.require_live(folder_id)?;

        match principal {
            PrincipalRef::User(id) => {
                UserRepository::find_by_id(&mut tx, id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
            }
            PrincipalRef::Role(id) => {
                UserRepository::find_role(&mut tx, id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
            }
        }

        let entry = FolderPermissionRepository::grant(&mut tx, folder_id, principal).await?;
        tx.commit().await?;

        info!(user = %ctx.actor(), folder_id = %folder_id, principal = ?principal, "Folder permission granted");
        Ok(entry)
    }

    /// Removes an entry. Returns whether one existed.
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        principal: PrincipalRef,
    ) -> AppResult<bool> {
        let mut tx = self.db.begin().await?;
        let folder = FolderRepository::get(&mut tx, folder_id).await?;
        let scope = Scope::load(&mut tx, ctx, folder.project_id).await?;
        scope.require(Capability::ManageFolderPermissions)?;

        let removed = FolderPermissionRepository::revoke(&mut tx, folder_id, principal).await?;
        tx.commit().await?;

        if removed {
            info!(user = %ctx.actor(), folder_id = %folder_id, principal = ?principal, "Folder permission revoked");
        }
        Ok(removed)
    }

    /// Whether the role has an explicit entry on the folder.
    pub async fn permission_for_role(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let entries = self.entries(ctx, folder_id).await?;
        Ok(entries
            .iter()
            .any(|e| e.principal() == PrincipalRef::Role(role_id)))
    }

    /// Users with an explicit entry on the folder.
    pub async fn permissions_users(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Vec<User>> {
        let entries = self.entries(ctx, folder_id).await?;
        let mut conn = self.db.acquire().await?;
        let mut users = Vec::new();
        for entry in entries {
            if let PrincipalRef::User(id) = entry.principal() {
                if let Some(user) = UserRepository::find_by_id(&mut conn, id).await? {
                    users.push(user);
                }
            }
        }
        users.sort_by(|a, b| a.login.cmp(&b.login));
        Ok(users)
    }
}
