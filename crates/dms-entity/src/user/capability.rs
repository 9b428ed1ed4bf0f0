//! Project-level capabilities of the document module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capabilities a role can grant inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Browse folders.
    ViewDmsfFolders,
    /// Browse and download files.
    ViewDmsfFiles,
    /// Create, edit, move, copy, delete and restore folders.
    FolderManipulation,
    /// Upload and edit files.
    FileManipulation,
    /// Delete files and links, and see the trash bin.
    FileDelete,
    /// Send documents by e-mail.
    EmailDocuments,
    /// Edit the per-folder permission table.
    ManageFolderPermissions,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 7] = [
        Self::ViewDmsfFolders,
        Self::ViewDmsfFiles,
        Self::FolderManipulation,
        Self::FileManipulation,
        Self::FileDelete,
        Self::EmailDocuments,
        Self::ManageFolderPermissions,
    ];

    /// Return the capability as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewDmsfFolders => "view_dmsf_folders",
            Self::ViewDmsfFiles => "view_dmsf_files",
            Self::FolderManipulation => "folder_manipulation",
            Self::FileManipulation => "file_manipulation",
            Self::FileDelete => "file_delete",
            Self::EmailDocuments => "email_documents",
            Self::ManageFolderPermissions => "manage_folder_permissions",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = dms_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| dms_core::AppError::validation(format!("Invalid capability: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!(
            "folder_manipulation".parse::<Capability>().unwrap(),
            Capability::FolderManipulation
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert!("delete_everything".parse::<Capability>().is_err());
    }
}
