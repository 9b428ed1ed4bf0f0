//! Restore and purge commands for a single folder.

use clap::Args;

use dms_core::config::AppConfig;
use dms_core::error::AppError;
use dms_core::types::FolderId;

use crate::output::{self, OutputFormat};

/// Arguments naming one folder
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder ID
    pub folder_id: FolderId,
}

/// Restore a folder from the trash.
pub async fn restore(args: &FolderArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config).await?;
    let folder = runtime
        .folders(config)
        .await?
        .restore(&runtime.ctx, args.folder_id)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&folder),
        OutputFormat::Table => {
            output::print_success(&format!("Folder '{}' restored (id: {})", folder.title, folder.id))
        }
    }
    Ok(())
}

/// Delete a folder and everything below it for good.
pub async fn purge(args: &FolderArgs, config: &AppConfig) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config).await?;
    runtime
        .folders(config)
        .await?
        .delete(&runtime.ctx, args.folder_id, true)
        .await?;

    output::print_success(&format!("Folder {} purged", args.folder_id));
    Ok(())
}
