//! Role entity model.

use dms_core::types::RoleId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::capability::Capability;

/// A named set of capabilities assigned to project members.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Display order.
    pub position: i64,
    /// Capabilities granted by this role. Loaded from `role_capabilities`.
    #[sqlx(skip)]
    pub capabilities: Vec<Capability>,
}

impl Role {
    /// Whether the role grants the capability.
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows() {
        let role = Role {
            id: RoleId::new(),
            name: "Developer".to_string(),
            position: 2,
            capabilities: vec![Capability::ViewDmsfFolders],
        };
        assert!(role.allows(Capability::ViewDmsfFolders));
        assert!(!role.allows(Capability::FolderManipulation));
    }
}
