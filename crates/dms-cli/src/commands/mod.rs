//! CLI command definitions and dispatch.

pub mod columns;
pub mod folder;
pub mod migrate;
pub mod trash;
pub mod tree;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use dms_core::config::AppConfig;
use dms_core::error::AppError;
use dms_core::types::ProjectId;
use dms_database::DatabasePool;
use dms_database::repositories::{LockRepository, ProjectRepository};
use dms_service::{FolderService, RequestContext, TrashService, TreeService};
use dms_storage::LocalStorageProvider;

use crate::output::OutputFormat;

/// Document folder administration
#[derive(Debug, Parser)]
#[command(name = "dms-cli", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to merge (e.g. `production`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Print the folder tree of a project
    Tree(tree::TreeArgs),
    /// List the trash bin of a project
    Trash(trash::TrashArgs),
    /// Restore a folder from the trash
    Restore(folder::FolderArgs),
    /// Permanently delete a folder with its subtree
    Purge(folder::FolderArgs),
    /// Show the document list column layout
    Columns,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::Tree(args) => tree::execute(args, config, self.format).await,
            Commands::Trash(args) => trash::execute(args, config, self.format).await,
            Commands::Restore(args) => folder::restore(args, config, self.format).await,
            Commands::Purge(args) => folder::purge(args, config).await,
            Commands::Columns => columns::execute(config, self.format).await,
        }
    }
}

/// Engine services wired from configuration. Commands act as the system.
pub struct Runtime {
    pub db: Arc<DatabasePool>,
    pub ctx: RequestContext,
}

impl Runtime {
    /// Connect to the configured database.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let db = Arc::new(DatabasePool::connect(&config.database).await?);
        Ok(Self {
            db,
            ctx: RequestContext::system(),
        })
    }

    /// Folder service backed by the configured blob root.
    pub async fn folders(&self, config: &AppConfig) -> Result<FolderService, AppError> {
        let storage = Arc::new(LocalStorageProvider::new(&config.storage.root).await?);
        let locks = Arc::new(LockRepository::new(self.db.pool().clone()));
        Ok(FolderService::new(self.db.clone(), storage, locks))
    }

    pub fn trees(&self, config: &AppConfig) -> TreeService {
        TreeService::new(self.db.clone(), config.dms.root_label.clone())
    }

    pub fn trash(&self) -> TrashService {
        TrashService::new(self.db.clone())
    }

    /// Resolve a project from its identifier or id.
    pub async fn project(&self, key: &str) -> Result<ProjectId, AppError> {
        let mut conn = self.db.acquire().await?;
        if let Ok(id) = key.parse::<ProjectId>() {
            return Ok(ProjectRepository::get(&mut conn, id).await?.id);
        }
        ProjectRepository::find_by_identifier(&mut conn, key)
            .await?
            .map(|p| p.id)
            .ok_or_else(|| AppError::not_found(format!("Project '{key}' not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms_core::error::ErrorKind;
    use dms_core::types::FolderId;

    #[tokio::test]
    async fn test_folders_creates_blob_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("blobs");
        let mut config = AppConfig::default();
        config.storage.root = root.to_string_lossy().into_owned();

        let runtime = Runtime {
            db: Arc::new(DatabasePool::in_memory().await.unwrap()),
            ctx: RequestContext::system(),
        };
        let folders = runtime.folders(&config).await.unwrap();
        assert!(root.is_dir());

        let err = folders.restore(&runtime.ctx, FolderId::new()).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
