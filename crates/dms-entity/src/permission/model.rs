//! Folder permission entry model.

use dms_core::types::{FolderId, FolderPermissionId, RoleId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Discriminator stored in `folder_permissions.principal_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    /// A single user.
    User,
    /// Every holder of a role.
    Role,
}

/// A (folder, principal) grant row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FolderPermission {
    /// Unique entry identifier.
    pub id: FolderPermissionId,
    /// The folder the grant applies to (and, by inheritance, its subtree).
    pub folder_id: FolderId,
    /// Whether the principal is a user or a role.
    pub principal_type: PrincipalType,
    /// The user or role id.
    pub principal_id: Uuid,
}

impl FolderPermission {
    /// The typed principal of this entry.
    pub fn principal(&self) -> PrincipalRef {
        match self.principal_type {
            PrincipalType::User => PrincipalRef::User(UserId::from_uuid(self.principal_id)),
            PrincipalType::Role => PrincipalRef::Role(RoleId::from_uuid(self.principal_id)),
        }
    }
}

/// A principal a folder permission can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum PrincipalRef {
    /// A user.
    User(UserId),
    /// A role.
    Role(RoleId),
}

impl PrincipalRef {
    /// Split into the stored discriminator and raw id.
    pub fn into_parts(self) -> (PrincipalType, Uuid) {
        match self {
            Self::User(id) => (PrincipalType::User, id.into_uuid()),
            Self::Role(id) => (PrincipalType::Role, id.into_uuid()),
        }
    }
}
