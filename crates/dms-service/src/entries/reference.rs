//! Entry references as submitted by list views: `folder-<id>`, `file-<id>`,
//! `folder-link-<id>` and `file-link-<id>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use dms_core::error::AppError;
use dms_core::types::{FileId, FolderId, LinkId};

/// A reference to one entry of a folder listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EntryRef {
    /// A folder.
    Folder(FolderId),
    /// A file.
    File(FileId),
    /// A link pointing at a folder.
    FolderLink(LinkId),
    /// A link pointing at a file.
    FileLink(LinkId),
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(id) => write!(f, "folder-{id}"),
            Self::File(id) => write!(f, "file-{id}"),
            Self::FolderLink(id) => write!(f, "folder-link-{id}"),
            Self::FileLink(id) => write!(f, "file-link-{id}"),
        }
    }
}

impl FromStr for EntryRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Invalid entry reference: '{s}'"));

        // Link prefixes first: "folder-" is a prefix of "folder-link-".
        let parsed = if let Some(id) = s.strip_prefix("folder-link-") {
            id.parse().map(Self::FolderLink)
        } else if let Some(id) = s.strip_prefix("file-link-") {
            id.parse().map(Self::FileLink)
        } else if let Some(id) = s.strip_prefix("folder-") {
            id.parse().map(Self::Folder)
        } else if let Some(id) = s.strip_prefix("file-") {
            id.parse().map(Self::File)
        } else {
            return Err(invalid());
        };
        parsed.map_err(|_| invalid())
    }
}

impl From<EntryRef> for String {
    fn from(entry: EntryRef) -> Self {
        entry.to_string()
    }
}

impl TryFrom<String> for EntryRef {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_kind() {
        let folder = FolderId::new();
        let link = LinkId::new();
        assert_eq!(
            format!("folder-{folder}").parse::<EntryRef>().unwrap(),
            EntryRef::Folder(folder)
        );
        assert_eq!(
            format!("folder-link-{link}").parse::<EntryRef>().unwrap(),
            EntryRef::FolderLink(link)
        );
        assert_eq!(
            format!("file-link-{link}").parse::<EntryRef>().unwrap(),
            EntryRef::FileLink(link)
        );
    }

    #[test]
    fn test_display_matches_parse() {
        let entry = EntryRef::File(FileId::new());
        assert_eq!(entry.to_string().parse::<EntryRef>().unwrap(), entry);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("folder-12".parse::<EntryRef>().is_err());
        assert!("document-1".parse::<EntryRef>().is_err());
        assert!("".parse::<EntryRef>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let entry = EntryRef::Folder(FolderId::new());
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, format!("\"{entry}\""));
        let back: EntryRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
