//! Lifecycle status shared by folders, files and links.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Soft-delete state of a document entry.
///
/// A purged entry has no row at all, so it has no status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Listed and addressable.
    Active,
    /// In the trash bin; hidden from every listing but restorable.
    Deleted,
}

impl EntryStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
