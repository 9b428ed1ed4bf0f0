//! Shared fixture for service integration tests.
//!
//! Builds an in-memory database and a temporary blob directory seeded with
//! two projects, four users, three roles and this folder layout in
//! project one:
//!
//! ```text
//! folder1
//!   folder2   (entry for `third` only, locked)
//!   folder3
//!   report.txt, link to folder6
//! folder4     (deleted)
//!   folder5
//! folder6     (empty)
//! folder7     (entries for `developer` and the Manager role)
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use dms_core::config::dms::EmailConfig;
use dms_core::traits::LockedResource;
use dms_core::types::{FolderId, ProjectId};
use dms_database::DatabasePool;
use dms_database::repositories::{
    FolderPermissionRepository, FolderRepository, LockRepository, ProjectRepository, UserRepository,
};
use dms_entity::file::{File, Revision};
use dms_entity::folder::CreateFolder;
use dms_entity::link::Link;
use dms_entity::permission::PrincipalRef;
use dms_entity::project::CreateProject;
use dms_entity::status::EntryStatus;
use dms_entity::user::{Capability, Role, User};
use dms_service::file::CreateFileRequest;
use dms_service::link::{CreateLinkRequest, LinkTarget};
use dms_service::{
    EmailService, EntriesService, FileService, FolderService, LinkService, PermissionService,
    RequestContext, TrashService, TreeService,
};
use dms_storage::LocalStorageProvider;

/// Content of the seeded file.
pub const REPORT: &[u8] = b"quarterly numbers";

/// A fully wired service stack over seeded data.
pub struct TestApp {
    pub db: Arc<DatabasePool>,
    pub storage: Arc<LocalStorageProvider>,
    pub folders: Arc<FolderService>,
    pub files: Arc<FileService>,
    pub links: Arc<LinkService>,
    pub trees: TreeService,
    pub permissions: PermissionService,
    pub trash: TrashService,
    pub entries: EntriesService,
    pub email: EmailService,

    pub admin: User,
    pub manager: User,
    pub developer: User,
    pub third: User,
    pub manager_role: Role,
    pub developer_role: Role,
    pub anonymous_role: Role,

    pub project1: ProjectId,
    pub project2: ProjectId,
    pub f1: FolderId,
    pub f2: FolderId,
    pub f3: FolderId,
    pub f4: FolderId,
    pub f5: FolderId,
    pub f6: FolderId,
    pub f7: FolderId,
    pub file: File,
    pub revision: Revision,
    pub link: Link,

    _blobs: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Arc::new(DatabasePool::in_memory().await.unwrap());
        let blobs = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorageProvider::new(blobs.path()).await.unwrap());
        let locks = Arc::new(LockRepository::new(db.pool().clone()));

        let folders = Arc::new(FolderService::new(db.clone(), storage.clone(), locks.clone()));
        let files = Arc::new(FileService::new(db.clone(), storage.clone(), locks.clone()));
        let links = Arc::new(LinkService::new(db.clone()));
        let trees = TreeService::new(db.clone(), "Documents");
        let permissions = PermissionService::new(db.clone());
        let trash = TrashService::new(db.clone());
        let entries = EntriesService::new(db.clone(), folders.clone(), files.clone(), links.clone());
        let email = EmailService::new(
            db.clone(),
            EmailConfig {
                from: None,
                reply_to: Some("docs@example.org".into()),
                links_only: false,
            },
        );

        let mut conn = db.acquire().await.unwrap();

        let admin = UserRepository::create_user(&mut conn, "admin", "Ada", "Admin", Some("admin@example.org"), true)
            .await
            .unwrap();
        let manager = UserRepository::create_user(&mut conn, "jsmith", "John", "Smith", Some("jsmith@example.org"), false)
            .await
            .unwrap();
        let developer = UserRepository::create_user(&mut conn, "dlopper", "Dave", "Lopper", Some("dlopper@example.org"), false)
            .await
            .unwrap();
        let third = UserRepository::create_user(&mut conn, "rhill", "Robert", "Hill", None, false)
            .await
            .unwrap();

        let manager_role = UserRepository::create_role(&mut conn, "Manager", 1, &Capability::ALL)
            .await
            .unwrap();
        let developer_role = UserRepository::create_role(
            &mut conn,
            "Developer",
            2,
            &[Capability::ViewDmsfFolders, Capability::ViewDmsfFiles],
        )
        .await
        .unwrap();
        let anonymous_role = UserRepository::create_role(
            &mut conn,
            "Anonymous",
            3,
            &[Capability::ViewDmsfFolders, Capability::ViewDmsfFiles],
        )
        .await
        .unwrap();

        let mut project_ids = Vec::new();
        for identifier in ["ecookbook", "onlinestore"] {
            let project = ProjectRepository::create(
                &mut conn,
                &CreateProject {
                    identifier: identifier.into(),
                    name: identifier.into(),
                    dms_enabled: true,
                },
            )
            .await
            .unwrap();
            ProjectRepository::set_anonymous_role(&mut conn, project.id, Some(anonymous_role.id))
                .await
                .unwrap();
            UserRepository::add_member(&mut conn, project.id, manager.id, manager_role.id)
                .await
                .unwrap();
            UserRepository::add_member(&mut conn, project.id, developer.id, developer_role.id)
                .await
                .unwrap();
            UserRepository::add_member(&mut conn, project.id, third.id, developer_role.id)
                .await
                .unwrap();
            project_ids.push(project.id);
        }
        let (project1, project2) = (project_ids[0], project_ids[1]);

        let f1 = seed_folder(&mut conn, project1, None, "folder1").await;
        let f2 = seed_folder(&mut conn, project1, Some(f1), "folder2").await;
        let f3 = seed_folder(&mut conn, project1, Some(f1), "folder3").await;
        let f4 = seed_folder(&mut conn, project1, None, "folder4").await;
        let f5 = seed_folder(&mut conn, project1, Some(f4), "folder5").await;
        let f6 = seed_folder(&mut conn, project1, None, "folder6").await;
        let f7 = seed_folder(&mut conn, project1, None, "folder7").await;

        FolderRepository::set_status(&mut conn, f4, EntryStatus::Deleted, Some(admin.id))
            .await
            .unwrap();
        FolderPermissionRepository::grant(&mut conn, f2, PrincipalRef::User(third.id))
            .await
            .unwrap();
        FolderPermissionRepository::grant(&mut conn, f7, PrincipalRef::User(developer.id))
            .await
            .unwrap();
        FolderPermissionRepository::grant(&mut conn, f7, PrincipalRef::Role(manager_role.id))
            .await
            .unwrap();
        LockRepository::create(&mut conn, LockedResource::Folder(f2), Some(third.id), None)
            .await
            .unwrap();
        drop(conn);

        let system = RequestContext::system();
        let (file, revision) = files
            .create_file(
                &system,
                CreateFileRequest {
                    project_id: project1,
                    folder_id: Some(f1),
                    name: "report.txt".into(),
                    mime_type: Some("text/plain".into()),
                    content: Bytes::from_static(REPORT),
                },
            )
            .await
            .unwrap();
        let link = links
            .create_link(
                &system,
                CreateLinkRequest {
                    project_id: project1,
                    folder_id: Some(f1),
                    name: None,
                    target: LinkTarget::Folder(f6),
                },
            )
            .await
            .unwrap();

        Self {
            db,
            storage,
            folders,
            files,
            links,
            trees,
            permissions,
            trash,
            entries,
            email,
            admin,
            manager,
            developer,
            third,
            manager_role,
            developer_role,
            anonymous_role,
            project1,
            project2,
            f1,
            f2,
            f3,
            f4,
            f5,
            f6,
            f7,
            file,
            revision,
            link,
            _blobs: blobs,
        }
    }

    /// Request context acting as the given user.
    pub fn as_user(&self, user: &User) -> RequestContext {
        RequestContext::user(user.id, user.admin)
    }

    /// Number of folders stored for a project, any status.
    pub async fn folder_count(&self, project_id: ProjectId) -> usize {
        let mut conn = self.db.acquire().await.unwrap();
        FolderRepository::list_by_project(&mut conn, project_id)
            .await
            .unwrap()
            .len()
    }

    /// Number of rows in a table.
    pub async fn row_count(&self, table: &str) -> i64 {
        let mut conn = self.db.acquire().await.unwrap();
        let sql = format!("SELECT COUNT(*) FROM {table}");
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *conn)
            .await
            .unwrap()
    }

    /// Number of rows in a table that belong to a project.
    pub async fn project_row_count(&self, table: &str, project_id: ProjectId) -> i64 {
        let mut conn = self.db.acquire().await.unwrap();
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE project_id = ?");
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(project_id)
            .fetch_one(&mut *conn)
            .await
            .unwrap()
    }
}

async fn seed_folder(
    conn: &mut sqlx::SqliteConnection,
    project_id: ProjectId,
    parent_id: Option<FolderId>,
    title: &str,
) -> FolderId {
    FolderRepository::create(
        conn,
        &CreateFolder {
            project_id,
            parent_id,
            title: title.into(),
            description: String::new(),
            position: 0,
        },
        None,
    )
    .await
    .unwrap()
    .id
}
