//! Trash listing command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use dms_core::config::AppConfig;
use dms_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the trash command
#[derive(Debug, Args)]
pub struct TrashArgs {
    /// Project identifier or id
    pub project: String,
}

/// Trash display row
#[derive(Debug, Serialize, Tabled)]
struct TrashRow {
    /// Entry kind
    kind: &'static str,
    /// Entry ID
    id: String,
    /// Title or name
    name: String,
    /// Deleted at
    deleted_at: String,
}

/// List the deleted entries of a project.
pub async fn execute(args: &TrashArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config).await?;
    let project_id = runtime.project(&args.project).await?;
    let listing = runtime.trash().trash(&runtime.ctx, project_id).await?;

    if format == OutputFormat::Json {
        output::print_json(&listing);
        return Ok(());
    }

    let stamp = |t: chrono::DateTime<chrono::Utc>| t.format("%Y-%m-%d %H:%M").to_string();
    let mut rows = Vec::with_capacity(listing.len());
    rows.extend(listing.folders.iter().map(|f| TrashRow {
        kind: "folder",
        id: f.id.to_string(),
        name: f.title.clone(),
        deleted_at: stamp(f.updated_at),
    }));
    rows.extend(listing.files.iter().map(|f| TrashRow {
        kind: "file",
        id: f.id.to_string(),
        name: f.name.clone(),
        deleted_at: stamp(f.updated_at),
    }));
    rows.extend(listing.links.iter().map(|l| TrashRow {
        kind: "link",
        id: l.id.to_string(),
        name: l.name.clone(),
        deleted_at: stamp(l.updated_at),
    }));

    output::print_list(&rows, format);
    Ok(())
}
