//! Folder tree projection used by menus and folder pickers.

use std::fmt;

use dms_core::types::FolderId;
use serde::{Deserialize, Serialize};

/// Indentation marker repeated once per tree level.
pub const INDENT: &str = "...";

/// One row of a folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Display depth; the root entry is 0.
    pub depth: usize,
    /// The folder, or None for the project root container.
    pub folder_id: Option<FolderId>,
    /// Folder title (or the root label).
    pub title: String,
}

impl TreeEntry {
    /// Title indented by depth, e.g. `......folder2`.
    pub fn label(&self) -> String {
        format!("{}{}", INDENT.repeat(self.depth), self.title)
    }
}

/// A depth-first, display-ordered sequence of tree rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTree {
    /// Rows in display order.
    pub entries: Vec<TreeEntry>,
}

impl FolderTree {
    /// Create an empty folder tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indented labels in display order.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(TreeEntry::label).collect()
    }
}

impl fmt::Display for FolderTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry.label())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_indentation() {
        let entry = TreeEntry {
            depth: 2,
            folder_id: None,
            title: "folder2".to_string(),
        };
        assert_eq!(entry.label(), "......folder2");
    }
}
