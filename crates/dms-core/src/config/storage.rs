//! Revision blob storage configuration.

use serde::{Deserialize, Serialize};

/// Where revision content is kept on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for revision blobs.
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> String {
    "data/files/dmsf".to_string()
}
