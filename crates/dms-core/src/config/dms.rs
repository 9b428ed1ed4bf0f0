//! Document management settings.

use serde::{Deserialize, Serialize};

/// Columns shown in the document list when nothing is configured.
pub const DEFAULT_COLUMNS: [&str; 6] = ["title", "size", "modified", "version", "workflow", "author"];

/// Plugin-level settings of the document module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmsConfig {
    /// Label of the entry that stands for the project root in folder trees.
    #[serde(default = "default_root_label")]
    pub root_label: String,
    /// Enabled list-view columns, including custom field names.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    /// Document e-mail settings.
    #[serde(default)]
    pub email: EmailConfig,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            root_label: default_root_label(),
            columns: default_columns(),
            email: EmailConfig::default(),
        }
    }
}

/// Settings applied to document e-mail drafts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Sender address; the current user's address is used when unset.
    #[serde(default)]
    pub from: Option<String>,
    /// Reply-to address.
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Send links to the documents instead of attachments.
    #[serde(default)]
    pub links_only: bool,
}

fn default_root_label() -> String {
    "Documents".to_string()
}

fn default_columns() -> Vec<String> {
    DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
}
