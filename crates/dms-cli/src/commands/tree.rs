//! Folder tree command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use dms_core::config::AppConfig;
use dms_core::error::AppError;
use dms_entity::folder::TreeEntry;

use crate::output::{self, OutputFormat};

/// Arguments for the tree command
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Project identifier or id
    pub project: String,
}

/// Tree display row
#[derive(Debug, Serialize, Tabled)]
struct TreeRow {
    /// Folder ID
    id: String,
    /// Indented title
    folder: String,
}

impl From<&TreeEntry> for TreeRow {
    fn from(entry: &TreeEntry) -> Self {
        Self {
            id: entry.folder_id.map(|id| id.to_string()).unwrap_or_default(),
            folder: entry.label(),
        }
    }
}

/// Print the directory tree of a project.
pub async fn execute(args: &TreeArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config).await?;
    let project_id = runtime.project(&args.project).await?;

    let tree = runtime
        .trees(config)
        .directory_tree(&runtime.ctx, project_id)
        .await?;

    match format {
        OutputFormat::Table => {
            let rows: Vec<TreeRow> = tree.entries.iter().map(TreeRow::from).collect();
            output::print_list(&rows, format);
        }
        OutputFormat::Json => output::print_json(&tree),
    }
    Ok(())
}
