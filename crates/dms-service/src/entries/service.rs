//! Delete and restore applied to a selection of entries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dms_core::error::{AppError, ErrorKind};
use dms_core::result::AppResult;
use dms_core::types::{LinkId, ProjectId};
use dms_database::DatabasePool;
use dms_database::repositories::{FileRepository, FolderRepository, LinkRepository};
use dms_entity::link::LinkTargetType;
use dms_entity::user::Capability;

use super::reference::EntryRef;
use crate::context::RequestContext;
use crate::file::FileService;
use crate::folder::FolderService;
use crate::link::LinkService;
use crate::scope::Scope;

/// One entry that could not be processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFailure {
    /// The rejected entry.
    pub entry: EntryRef,
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub message: String,
}

/// Result of a bulk operation. Successful entries stay applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntriesOutcome {
    /// Entries processed successfully.
    pub applied: Vec<EntryRef>,
    /// Entries rejected with their reasons.
    pub failures: Vec<EntryFailure>,
}

impl EntriesOutcome {
    /// Whether every entry was applied.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Delete { hard: bool },
    Restore,
}

/// Applies delete and restore to mixed selections.
#[derive(Debug, Clone)]
pub struct EntriesService {
    db: Arc<DatabasePool>,
    folders: Arc<FolderService>,
    files: Arc<FileService>,
    links: Arc<LinkService>,
}

impl EntriesService {
    /// Creates a new entries service.
    pub fn new(
        db: Arc<DatabasePool>,
        folders: Arc<FolderService>,
        files: Arc<FileService>,
        links: Arc<LinkService>,
    ) -> Self {
        Self {
            db,
            folders,
            files,
            links,
        }
    }

    /// Deletes each entry; `commit` purges instead of trashing.
    pub async fn delete_entries(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        entries: &[EntryRef],
        commit: bool,
    ) -> AppResult<EntriesOutcome> {
        self.apply(ctx, project_id, entries, Operation::Delete { hard: commit })
            .await
    }

    /// Restores each entry from the trash.
    pub async fn restore_entries(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        entries: &[EntryRef],
    ) -> AppResult<EntriesOutcome> {
        self.apply(ctx, project_id, entries, Operation::Restore).await
    }

    async fn apply(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        entries: &[EntryRef],
        operation: Operation,
    ) -> AppResult<EntriesOutcome> {
        if entries.is_empty() {
            return Err(AppError::validation("No entries selected"));
        }
        self.check_capabilities(ctx, project_id, entries, operation).await?;

        let mut outcome = EntriesOutcome::default();
        for entry in entries {
            match self.apply_one(ctx, project_id, *entry, operation).await {
                Ok(()) => outcome.applied.push(*entry),
                Err(e) if is_entry_level(e.kind) => {
                    warn!(user = %ctx.actor(), entry = %entry, error = %e, "Entry rejected");
                    outcome.failures.push(EntryFailure {
                        entry: *entry,
                        kind: e.kind,
                        message: e.message,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            user = %ctx.actor(),
            project_id = %project_id,
            operation = ?operation,
            applied = outcome.applied.len(),
            failed = outcome.failures.len(),
            "Entries processed"
        );
        Ok(outcome)
    }

    /// Rejects the whole request when a required capability is missing.
    async fn check_capabilities(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        entries: &[EntryRef],
        operation: Operation,
    ) -> AppResult<()> {
        let mut conn = self.db.acquire().await?;
        let scope = Scope::load(&mut conn, ctx, project_id).await?;

        let has_folders = entries.iter().any(|e| matches!(e, EntryRef::Folder(_)));
        let has_documents = entries.iter().any(|e| !matches!(e, EntryRef::Folder(_)));

        if has_folders {
            scope.require(Capability::FolderManipulation)?;
        }
        if has_documents {
            match operation {
                Operation::Delete { .. } => scope.require(Capability::FileDelete)?,
                Operation::Restore => scope.require(Capability::ViewDmsfFiles)?,
            }
        }
        Ok(())
    }

    async fn apply_one(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        entry: EntryRef,
        operation: Operation,
    ) -> AppResult<()> {
        self.check_membership(project_id, entry).await?;

        match (entry, operation) {
            (EntryRef::Folder(id), Operation::Delete { hard }) => self.folders.delete(ctx, id, hard).await,
            (EntryRef::Folder(id), Operation::Restore) => self.folders.restore(ctx, id).await.map(drop),
            (EntryRef::File(id), Operation::Delete { hard }) => self.files.delete(ctx, id, hard).await,
            (EntryRef::File(id), Operation::Restore) => self.files.restore(ctx, id).await.map(drop),
            (EntryRef::FolderLink(id) | EntryRef::FileLink(id), Operation::Delete { hard }) => {
                self.links.delete(ctx, id, hard).await
            }
            (EntryRef::FolderLink(id) | EntryRef::FileLink(id), Operation::Restore) => {
                self.links.restore(ctx, id).await.map(drop)
            }
        }
    }

    /// The entry must exist in the project and match its declared kind.
    async fn check_membership(&self, project_id: ProjectId, entry: EntryRef) -> AppResult<()> {
        let mut conn = self.db.acquire().await?;
        let owner = match entry {
            EntryRef::Folder(id) => FolderRepository::get(&mut conn, id).await?.project_id,
            EntryRef::File(id) => FileRepository::get(&mut conn, id).await?.project_id,
            EntryRef::FolderLink(id) => link_owner(&mut conn, id, LinkTargetType::Folder).await?,
            EntryRef::FileLink(id) => link_owner(&mut conn, id, LinkTargetType::File).await?,
        };
        if owner != project_id {
            return Err(AppError::validation(format!(
                "Entry {entry} does not belong to project {project_id}"
            )));
        }
        Ok(())
    }
}

async fn link_owner(
    conn: &mut sqlx::SqliteConnection,
    id: LinkId,
    expected: LinkTargetType,
) -> AppResult<ProjectId> {
    let link = LinkRepository::get(conn, id).await?;
    if link.target_type != expected {
        return Err(AppError::validation(format!(
            "Link {id} does not point at a {}",
            expected.as_str()
        )));
    }
    Ok(link.project_id)
}

/// Errors that reject a single entry rather than the whole request.
fn is_entry_level(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::NotFound
            | ErrorKind::Authorization
            | ErrorKind::Validation
            | ErrorKind::Conflict
            | ErrorKind::Cycle
    )
}
