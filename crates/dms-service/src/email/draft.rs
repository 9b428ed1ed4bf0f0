//! Collects the documents of a selection into an e-mail draft.
//!
//! Delivery is left to the caller; this module only resolves which file
//! revisions the message would carry and with which sender settings.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::info;

use dms_core::config::dms::EmailConfig;
use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::types::{FileId, FolderId, ProjectId, RevisionId};
use dms_database::DatabasePool;
use dms_database::repositories::{FileRepository, FolderRepository, LinkRepository, UserRepository};
use dms_entity::file::File;
use dms_entity::link::LinkTargetType;
use dms_entity::user::Capability;

use crate::context::RequestContext;
use crate::entries::EntryRef;
use crate::scope::Scope;

/// A file revision attached to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// The attached file.
    pub file_id: FileId,
    /// File name.
    pub name: String,
    /// The revision that would be sent.
    pub revision_id: RevisionId,
    /// Size of the revision.
    pub size_bytes: i64,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
}

/// A prepared, unsent document e-mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDraft {
    /// Sender address.
    pub from: Option<String>,
    /// Reply-to address.
    pub reply_to: Option<String>,
    /// Send links instead of attachments.
    pub links_only: bool,
    /// Files of the selection, folders expanded.
    pub files: Vec<Attachment>,
    /// When the draft was prepared.
    pub prepared_at: DateTime<Utc>,
}

impl EmailDraft {
    /// Combined size of all attachments.
    pub fn total_size(&self) -> i64 {
        self.files.iter().map(|a| a.size_bytes).sum()
    }
}

/// Prepares document e-mails.
#[derive(Debug, Clone)]
pub struct EmailService {
    db: Arc<DatabasePool>,
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new e-mail service.
    pub fn new(db: Arc<DatabasePool>, config: EmailConfig) -> Self {
        Self { db, config }
    }

    /// Builds a draft for the selected entries of a project.
    ///
    /// Folders are expanded recursively to their active files, skipping
    /// folders the principal cannot see. Links are resolved to their
    /// targets. Requires `view_dmsf_files` and `email_documents`.
    pub async fn email_draft(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        entries: &[EntryRef],
    ) -> AppResult<EmailDraft> {
        if entries.is_empty() {
            return Err(AppError::validation("No entries selected"));
        }

        let mut conn = self.db.acquire().await?;
        let scope = Scope::load(&mut conn, ctx, project_id).await?;
        scope.access.require_all(&[Capability::ViewDmsfFiles, Capability::EmailDocuments])?;

        let mut collector = Collector::new(ctx);
        collector.scopes.insert(project_id, scope);
        for entry in entries {
            collector.collect(&mut conn, project_id, *entry).await?;
        }

        let from = match &self.config.from {
            Some(from) => Some(from.clone()),
            None => match ctx.user_id() {
                Some(id) => UserRepository::find_by_id(&mut conn, id)
                    .await?
                    .and_then(|u| u.mail),
                None => None,
            },
        };

        let draft = EmailDraft {
            from,
            reply_to: self.config.reply_to.clone(),
            links_only: self.config.links_only,
            files: collector.files,
            prepared_at: ctx.request_time,
        };

        info!(
            user = %ctx.actor(),
            project_id = %project_id,
            files = draft.files.len(),
            size = draft.total_size(),
            "E-mail draft prepared"
        );
        Ok(draft)
    }
}

struct Collector<'a> {
    ctx: &'a RequestContext,
    scopes: HashMap<ProjectId, Scope>,
    seen: HashSet<FileId>,
    files: Vec<Attachment>,
}

impl<'a> Collector<'a> {
    fn new(ctx: &'a RequestContext) -> Self {
        Self {
            ctx,
            scopes: HashMap::new(),
            seen: HashSet::new(),
            files: Vec::new(),
        }
    }

    async fn scope(&mut self, conn: &mut SqliteConnection, project_id: ProjectId) -> AppResult<&mut Scope> {
        if !self.scopes.contains_key(&project_id) {
            let scope = Scope::load(conn, self.ctx, project_id).await?;
            scope.require(Capability::ViewDmsfFiles)?;
            self.scopes.insert(project_id, scope);
        }
        self.scopes
            .get_mut(&project_id)
            .ok_or_else(|| AppError::internal("Project scope missing"))
    }

    async fn collect(
        &mut self,
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        entry: EntryRef,
    ) -> AppResult<()> {
        match entry {
            EntryRef::Folder(id) => {
                let folder = FolderRepository::get(conn, id).await?;
                ensure_owner(project_id, folder.project_id, entry)?;
                self.expand_folder(conn, folder.project_id, id).await
            }
            EntryRef::File(id) => {
                let file = FileRepository::get(conn, id).await?;
                ensure_owner(project_id, file.project_id, entry)?;
                self.attach(conn, file).await
            }
            EntryRef::FolderLink(id) | EntryRef::FileLink(id) => {
                let link = LinkRepository::get(conn, id).await?;
                ensure_owner(project_id, link.project_id, entry)?;
                if link.is_deleted() {
                    return Err(AppError::validation(format!("Link {id} is deleted")));
                }
                match (entry, link.target_type) {
                    (EntryRef::FolderLink(_), LinkTargetType::Folder) => {
                        let target = FolderId::from_uuid(link.target_id);
                        let folder = FolderRepository::get(conn, target).await?;
                        self.expand_folder(conn, folder.project_id, target).await
                    }
                    (EntryRef::FileLink(_), LinkTargetType::File) => {
                        let file = FileRepository::get(conn, FileId::from_uuid(link.target_id)).await?;
                        self.attach(conn, file).await
                    }
                    _ => Err(AppError::validation(format!(
                        "Link {id} does not point at a {}",
                        link.target_type.as_str()
                    ))),
                }
            }
        }
    }

    /// Attaches an explicitly selected file.
    async fn attach(&mut self, conn: &mut SqliteConnection, file: File) -> AppResult<()> {
        if file.is_deleted() {
            return Err(AppError::validation(format!("File {} is deleted", file.id)));
        }
        self.scope(conn, file.project_id)
            .await?
            .require_container(file.folder_id)?;
        self.push(conn, file).await
    }

    /// Adds the active files below a folder, depth first.
    async fn expand_folder(
        &mut self,
        conn: &mut SqliteConnection,
        project_id: ProjectId,
        folder_id: FolderId,
    ) -> AppResult<()> {
        let scope = self.scope(conn, project_id).await?;
        scope.require(Capability::ViewDmsfFolders)?;
        scope.require_live(folder_id)?;

        let mut stack = vec![folder_id];
        while let Some(current) = stack.pop() {
            for file in FileRepository::list_in_folder(conn, project_id, Some(current)).await? {
                if !file.is_deleted() {
                    self.push(conn, file).await?;
                }
            }

            let scope = self.scope(conn, project_id).await?;
            let children = FolderRepository::children(conn, project_id, Some(current)).await?;
            for child in children.iter().rev() {
                if !child.is_deleted() && scope.acl.is_visible(child.id) {
                    stack.push(child.id);
                }
            }
        }
        Ok(())
    }

    async fn push(&mut self, conn: &mut SqliteConnection, file: File) -> AppResult<()> {
        if !self.seen.insert(file.id) {
            return Ok(());
        }
        let revision = FileRepository::latest_revision(conn, file.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {} has no revision", file.id)))?;
        self.files.push(Attachment {
            file_id: file.id,
            name: file.name,
            revision_id: revision.id,
            size_bytes: revision.size_bytes,
            folder_id: file.folder_id,
        });
        Ok(())
    }
}

fn ensure_owner(project_id: ProjectId, owner: ProjectId, entry: EntryRef) -> AppResult<()> {
    if owner == project_id {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Entry {entry} does not belong to project {project_id}"
        )))
    }
}
